use std::ffi::OsStr;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::path::Path;
use std::process::{Command, Output};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// 2023-09-16T13:00:00Z.
pub const SESSION_START_MS: u64 = 1_694_869_200_000;
pub const SESSION_END_MS: u64 = 1_694_872_800_000;
pub const SESSION_KEY: u32 = 9158;

const SESSION_JSON: &str = r#"{
  "session_key": 9158,
  "session_name": "Race",
  "start_ms": 1694869200000,
  "end_ms": 1694872800000,
  "total_laps": 62,
  "drivers": [
    {"driver_number": 1, "name_acronym": "VER"},
    {"driver_number": 44, "name_acronym": "HAM"}
  ]
}"#;

const SESSIONS_JSON: &str = r#"[
  {"session_key": 9158, "session_name": "Race",
   "date_start": "2023-09-16T13:00:00+00:00", "date_end": "2023-09-16T14:00:00+00:00"}
]"#;

const DRIVERS_JSON: &str = r#"[
  {"driver_number": 44, "name_acronym": "HAM", "team_name": "Mercedes"},
  {"driver_number": 1, "name_acronym": "VER", "team_name": "Red Bull Racing"}
]"#;

const LOCATION_JSON: &str = r#"[
  {"date": "2023-09-16T13:01:30.500+00:00", "driver_number": 1, "x": 0, "y": 0, "z": 0},
  {"date": "2023-09-16T13:01:31.500+00:00", "driver_number": 1, "x": 100, "y": 0, "z": 0},
  {"date": "2023-09-16T13:01:30.500+00:00", "driver_number": 44, "x": 500, "y": 0, "z": 0},
  {"date": "2023-09-16T13:01:31.500+00:00", "driver_number": 44, "x": 600, "y": 0, "z": 0},
  {"date": "2023-09-16T13:01:32.000+00:00", "driver_number": 44}
]"#;

const CAR_DATA_JSON: &str = r#"[
  {"date": "2023-09-16T13:01:30.500+00:00", "driver_number": 44, "speed": 280, "rpm": 11000, "throttle": 100, "brake": 0, "n_gear": 7, "drs": 0},
  {"date": "2023-09-16T13:01:31.000+00:00", "driver_number": 44, "speed": 290, "rpm": 11200, "throttle": 100, "brake": 0, "n_gear": 8, "drs": 12}
]"#;

const POSITION_JSON: &str = r#"[
  {"date": "2023-09-16T13:00:05+00:00", "driver_number": 1, "position": 1},
  {"date": "2023-09-16T13:00:05+00:00", "driver_number": 44, "position": 2}
]"#;

const LAPS_JSON: &str = r#"[
  {"date_start": "2023-09-16T13:00:30+00:00", "driver_number": 1, "lap_number": 1},
  {"date_start": "2023-09-16T13:00:31+00:00", "driver_number": 44, "lap_number": 1},
  {"date_start": "2023-09-16T13:01:20+00:00", "driver_number": 1, "lap_number": 2}
]"#;

const RACE_CONTROL_JSON: &str = r#"[
  {"date": "2023-09-16T13:00:10+00:00", "category": "Flag", "flag": "GREEN", "message": "GREEN LIGHT - PIT EXIT OPEN"},
  {"date": "2023-09-16T13:30:00+00:00", "category": "SafetyCar", "message": "SAFETY CAR DEPLOYED"}
]"#;

/// Raw records per endpoint, in the API's wire format.
#[must_use]
pub fn stream_json(endpoint: &str) -> Option<&'static str> {
    match endpoint {
        "location" => Some(LOCATION_JSON),
        "car_data" => Some(CAR_DATA_JSON),
        "position" => Some(POSITION_JSON),
        "laps" => Some(LAPS_JSON),
        "race_control" => Some(RACE_CONTROL_JSON),
        _ => None,
    }
}

/// Writes a recording directory for `--data-dir`.
///
/// # Errors
///
/// Returns an error if any file cannot be written.
pub fn write_recording(dir: &Path) -> Result<(), String> {
    std::fs::write(dir.join("session.json"), SESSION_JSON)
        .map_err(|err| format!("write session failed: {}", err))?;
    for endpoint in ["location", "car_data", "position", "laps", "race_control"] {
        let body = stream_json(endpoint).ok_or("missing stream fixture")?;
        std::fs::write(dir.join(format!("{}.json", endpoint)), body)
            .map_err(|err| format!("write {} failed: {}", endpoint, err))?;
    }
    Ok(())
}

pub struct ServerHandle {
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

/// Spawns a minimal telemetry API answering every range with the full
/// fixture for its endpoint.
///
/// # Errors
///
/// Returns an error if the listener cannot be created or configured.
pub fn spawn_api_server() -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            match listener.accept() {
                Ok((stream, _)) => {
                    thread::spawn(move || handle_client(stream));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(_) => break,
            }
        }
    });

    Ok((
        format!("http://{}/v1/", addr),
        ServerHandle {
            shutdown: shutdown_tx,
            thread: Some(handle),
        },
    ))
}

/// Like [`spawn_api_server`], but skips when sockets are not permitted.
///
/// # Errors
///
/// Returns an error for failures other than a denied bind.
pub fn spawn_api_server_or_skip() -> Result<Option<(String, ServerHandle)>, String> {
    match spawn_api_server() {
        Ok(server) => Ok(Some(server)),
        Err(err) if err.contains("Operation not permitted") || err.contains("Permission denied") => {
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn handle_client(mut stream: TcpStream) {
    if stream.set_nonblocking(false).is_err() {
        return;
    }
    let mut buffer = [0u8; 4096];
    let Ok(read) = stream.read(&mut buffer) else {
        return;
    };
    let request = String::from_utf8_lossy(buffer.get(..read).unwrap_or(&[])).into_owned();
    let endpoint = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|target| target.split('?').next())
        .and_then(|path| path.rsplit('/').next())
        .unwrap_or_default()
        .to_owned();

    let body = match endpoint.as_str() {
        "sessions" => Some(SESSIONS_JSON),
        "drivers" => Some(DRIVERS_JSON),
        other => stream_json(other),
    };
    let response = match body {
        Some(body) => format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        ),
        None => {
            let body = r#"{"detail": "No results found."}"#;
            format!(
                "HTTP/1.1 404 Not Found\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            )
        }
    };
    if stream.write_all(response.as_bytes()).is_err() {
        return;
    }
    if stream.flush().is_err() {
        return;
    }
    drop(stream.shutdown(Shutdown::Both));
}

/// Run the `paddock` binary and capture output.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_paddock<I, S>(args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = paddock_bin()?;
    Command::new(bin)
        .args(args)
        .env("PADDOCK_LOG", "error")
        .env_remove("PADDOCK_BASE_URL")
        .output()
        .map_err(|err| format!("run paddock failed: {}", err))
}

fn paddock_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_paddock").map_or_else(
        || Err("CARGO_BIN_EXE_paddock missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}
