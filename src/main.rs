// Main entry point that forwards to the meso-tiler-app binary
fn main() {
    std::process::exit(match meso_tiler_app::main() {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {e:#}");
            1
        }
    });
}
