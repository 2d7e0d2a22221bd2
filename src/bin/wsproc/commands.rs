use log::info;
use workspace_proc::{tokenize, SystemCapabilities};

pub fn check_requirements() {
    info!("Checking sandbox requirements");
    let caps = SystemCapabilities::detect();

    println!("Checking sandbox requirements...\n");
    println!("{}", caps.summary());
    println!();

    if caps.can_sandbox() {
        println!("--sandbox runs commands under bubblewrap");
    } else if caps.sandbox_supported {
        println!("--sandbox launches will fail until bwrap is installed");
    } else {
        println!("--sandbox is ignored on this platform; commands run unsandboxed");
    }
}

pub fn print_tokens(command_line: &str) {
    for token in tokenize(command_line) {
        println!("{}", token);
    }
}
