/// Example program to print the loaded configuration
///
/// Run with: cargo run -p strata-config --example print_config

fn main() {
    let config = strata_config::StrataConfig::load();

    println!("=== Strata Configuration ===\n");

    println!("Heap Settings:");
    println!("  Block Count: {}", config.heap.block_count);
    println!("  Overflow Limit: {:?}", config.heap.overflow_limit);
    println!();

    println!("Surface Settings:");
    println!("  Size: {}x{}", config.surface.width, config.surface.height);
    println!("  Background: {:?}", config.surface.background);
    println!();

    println!("Demo Settings:");
    println!("  Scene: {:?}", config.demo.scene);
    println!("  Output: {}", config.demo.output.display());
    println!();

    println!("Log Filter: {}", config.log.filter);
    println!();

    match toml::to_string_pretty(&config) {
        Ok(toml_str) => {
            println!("=== Serialized Configuration ===");
            println!("{}", toml_str);
        }
        Err(e) => {
            eprintln!("Failed to serialize config: {}", e);
        }
    }
}
