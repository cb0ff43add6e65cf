// src/banner.rs

/// Prints the application startup banner to the console.
pub fn print_banner() {
    // Using a raw string literal for the multi-line banner
    let banner = r#"
          _   _                 _          _    ___
  ___ ___| |_(_)_ __ ___   __ _| |_ ___   / \  |_ _|
 / _ / __| __| | '_ ` _ \ / _` | __/ _ \ / _ \  | |
|  __\__ \ |_| | | | | | | (_| | ||  __// ___ \ | |
 \___|___/\__|_|_| |_| |_|\__,_|\__\___/_/   \_\___|

    Instant AI Estimates for Home Repair Projects
"#;
    println!("{}", banner);
}
