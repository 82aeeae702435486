use beef_bindgen::cli;
use beef_bindgen::errors::fancy_unwrap;

fn main() {
  fancy_unwrap(cli::run_from_args());
}
