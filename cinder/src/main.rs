use std::process::ExitCode;

use cinder_driver::{Argument, Parser};

fn main() -> ExitCode {
    let argument = Argument::parse();
    cinder_driver::run(&argument)
}
