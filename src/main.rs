use std::process::ExitCode;

use atalaia::Pipeline;
use atalaia::report::{Console, Reporter as _};

fn main() -> ExitCode {
    match Pipeline::from_current_dir().and_then(|pipeline| pipeline.run()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            Console.fail(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
