pub mod cli_parser;
pub use cli_parser::Cli;

pub mod help_template;
pub use help_template::HELP_TEMPLATE;
