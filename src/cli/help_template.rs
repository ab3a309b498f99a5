use indoc::indoc;

// Help text template with placeholder
pub const HELP_TEMPLATE: &str = indoc! {r#"
    Examples:
      # Build a versioned index for the dataset in the current directory
      %BINARY_NAME% build --skip-header

      # Look up every checkout of an item
      %BINARY_NAME% search 12345

      # Only checkouts from July 2012
      %BINARY_NAME% search 12345 --year 2012 --month 7

      # Serve `id|year|month` requests over TCP
      %BINARY_NAME% serve --listen 127.0.0.1:7000

      # Serve the GUI front end over the named-pipe pair
      %BINARY_NAME% serve --transport fifo

      # Ask a running server, the way the front end does
      %BINARY_NAME% query 12345 --year 2012 --server 127.0.0.1:7000

      # Use index files stored elsewhere
      %BINARY_NAME% --dataset data/Data2005.csv --header data/header.dat --chain data/index.dat info
"#};
