//! Quick connectivity check against a running ETABS instance.
//!
//! Run on Windows with ETABS open and a model loaded:
//!
//! ```text
//! cargo run --example quick_check
//! ```

#[cfg(not(windows))]
fn main() {
    eprintln!("quick_check talks to a live ETABS instance and only runs on Windows.");
    std::process::exit(1);
}

#[cfg(windows)]
fn main() {
    use csi_tables_com::connect_to_etabs;

    println!("Attempting to connect to ETABS...");
    let client = match connect_to_etabs() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Connection failed: {e}");
            eprintln!("Ensure ETABS is running and a model is open, then try again.");
            std::process::exit(1);
        }
    };
    println!("Connected.");

    match client.model_filename() {
        Ok(name) => println!("Current model: {name}"),
        Err(_) => println!("Connected, but no model file saved yet"),
    }

    match client.results().tables().available() {
        Ok(keys) => {
            println!("{} tables available:", keys.len());
            for key in keys.iter().take(10) {
                println!("  {key}");
            }
        }
        Err(e) => println!("No tables yet ({e}) — run the analysis first."),
    }
}
