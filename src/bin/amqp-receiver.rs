use std::process::ExitCode;

use interop_shims::cli::{self, Role};

fn main() -> ExitCode {
    cli::main(Role::AmqpReceiver)
}
