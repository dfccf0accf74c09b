use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_dashboardd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn dashboardd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn send_line(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    line: &str,
) -> serde_json::Value {
    writeln!(stdin, "{}", line).expect("write request");
    stdin.flush().expect("flush request");

    let mut out = String::new();
    reader.read_line(&mut out).expect("read response line");
    assert!(!out.trim().is_empty(), "empty response for {}", line);
    serde_json::from_str(out.trim()).expect("parse response json")
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    let value = send_line(stdin, reader, &payload.to_string());
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let health = request(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(health["ok"], json!(true));
    assert_eq!(health["result"]["version"], json!(env!("CARGO_PKG_VERSION")));
    assert_eq!(health["result"]["subjectCount"], json!(6));
    assert_eq!(health["result"]["hasReport"], json!(false));

    for (i, method) in [
        "dashboard.get",
        "dashboard.clear",
        "setup.get",
        "reports.documentModel",
    ]
    .iter()
    .enumerate()
    {
        let resp = request(&mut stdin, &mut reader, &format!("m{}", i), method, json!({}));
        let code = resp
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str())
            .unwrap_or("");
        assert_ne!(code, "not_implemented", "unexpected unknown method for {}", method);
    }

    let unknown = request(&mut stdin, &mut reader, "u", "grid.get", json!({}));
    assert_eq!(unknown["ok"], json!(false));
    assert_eq!(unknown["error"]["code"], json!("not_implemented"));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn malformed_lines_do_not_kill_the_sidecar() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let bad = send_line(&mut stdin, &mut reader, "{not json");
    assert_eq!(bad["ok"], json!(false));
    assert_eq!(bad["error"]["code"], json!("bad_json"));

    // Blank lines are skipped without a response.
    writeln!(stdin).expect("write blank line");
    let health = request(&mut stdin, &mut reader, "after", "health", json!({}));
    assert_eq!(health["ok"], json!(true));

    drop(stdin);
    let _ = child.wait();
}
