fn main() {
    sitevision_scripts::run_cli();
}
