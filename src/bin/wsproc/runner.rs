use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use log::{debug, info};
use workspace_proc::{LaunchOptions, ProcessHandle, ReadOutcome, Result, StreamKind};

use crate::cli::RunArgs;

const CHUNK_SIZE: usize = 8192;

/// Merge file-based options with command-line flags; flags win
pub fn launch_options(args: &RunArgs) -> Result<LaunchOptions> {
    let mut options = match (&args.options, &args.command_line) {
        (Some(path), _) => LaunchOptions::from_json_file(path)?,
        (None, Some(line)) => LaunchOptions::new(line.clone()),
        (None, None) => LaunchOptions::default(),
    };

    if let Some(cwd) = &args.cwd {
        options.cwd = Some(cwd.clone());
    }
    if args.sandbox {
        options.sandbox = true;
    }
    if let Some(id) = &args.id {
        options.id = id.clone();
    } else if options.id.is_empty() {
        options.id = format!("wsproc-{}", std::process::id());
    }

    Ok(options)
}

/// Copy whatever is buffered on `stream` to `out`; true if anything moved
fn pump(handle: &mut ProcessHandle, stream: StreamKind, done: &mut bool, out: &mut dyn Write) -> bool {
    if *done {
        return false;
    }

    let mut buf = [0u8; CHUNK_SIZE];
    let mut moved = false;
    loop {
        match handle.read(stream, &mut buf) {
            ReadOutcome::Data(n) => {
                // A closed terminal must not stop the drain.
                let _ = out.write_all(&buf[..n]);
                moved = true;
            }
            ReadOutcome::EndOfStream => {
                debug!("{} closed", stream);
                *done = true;
                break;
            }
            ReadOutcome::WouldBlock => break,
        }
    }
    let _ = out.flush();
    moved
}

/// Launch and forward output until the process exits; returns its exit code
pub fn run(args: &RunArgs) -> Result<i32> {
    let options = launch_options(args)?;
    let mut handle = ProcessHandle::start(&options)?;
    info!("[{}] started pid {}", options.id, handle.pid());

    let idle = Duration::from_millis(args.poll_ms.max(1));
    let (mut stdout_done, mut stderr_done) = (false, false);
    let stdout = io::stdout();
    let stderr = io::stderr();

    loop {
        let moved_out = pump(&mut handle, StreamKind::Stdout, &mut stdout_done, &mut stdout.lock());
        let moved_err = pump(&mut handle, StreamKind::Stderr, &mut stderr_done, &mut stderr.lock());

        if stdout_done && stderr_done {
            if let Some(status) = handle.exit_status() {
                info!("[{}] exited with {}", options.id, status.code);
                handle.dispose();
                return Ok(status.code);
            }
        }

        if !moved_out && !moved_err {
            thread::sleep(idle);
        }
    }
}
