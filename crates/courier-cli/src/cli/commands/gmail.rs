//! Gmail connection command handlers.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::time::Duration;

use anyhow::Result;
use courier_core::api::{ApiClient, mask_token};
use courier_core::oauth::{GoogleAuthData, parse_redirect_input};
use courier_core::session::SessionController;

use super::{format_timestamp, prompt, require_session};

pub async fn connect(
    api: &ApiClient,
    controller: &mut SessionController,
    listen: Option<u16>,
) -> Result<()> {
    require_session(controller)?;
    let Some(token) = controller.token() else {
        anyhow::bail!("Not signed in. Run `courier login` (or `courier register`) first.");
    };

    let auth_url = api.with_bearer(token).gmail_auth_url().await?.auth_url;

    println!("To connect your Gmail account:");
    println!();
    println!("  1. A browser window will open (or visit the URL below)");
    println!("  2. Sign in with your Google account and grant Gmail access");
    println!("  3. Copy the URL you are redirected to and paste it here");
    println!();
    println!("Authorization URL:");
    println!("  {auth_url}");
    println!();

    // Try to open browser (best effort, skip in tests)
    if std::env::var("COURIER_NO_BROWSER").is_err() {
        let _ = open::that(&auth_url);
    }

    // Prefer the local listener when requested, fall back to manual paste.
    let input = match listen.and_then(wait_for_redirect) {
        Some(query) => query,
        None => prompt("Paste the redirect URL (or authorization code): ")?,
    };

    // Terminal callback errors (cancellation, no usable data) stop here;
    // no exchange request is made for them.
    let auth_data = GoogleAuthData::from_callback(parse_redirect_input(&input))?;

    println!("Exchanging authorization data for a session...");
    let resp = api.exchange_google(&auth_data).await?;

    controller.login(resp.token.clone(), resp.user.clone());

    println!();
    println!(
        "✓ Gmail connected for {} <{}> (token: {})",
        resp.user.name,
        resp.user.email,
        mask_token(&resp.token)
    );
    println!("  Session saved to: {}", controller.store().path().display());
    println!("  Try `courier send` or `courier history list`.");

    Ok(())
}

pub async fn status(api: &ApiClient, controller: &SessionController) -> Result<()> {
    require_session(controller)?;
    let Some(token) = controller.token() else {
        anyhow::bail!("Not signed in. Run `courier login` (or `courier register`) first.");
    };

    let status = api.with_bearer(token).gmail_status().await?;

    if status.connected {
        println!("Gmail: connected");
        if let Some(expires_at) = &status.expires_at {
            let suffix = match status.expired {
                Some(true) => " (expired)",
                _ => "",
            };
            println!("  access expires: {}{suffix}", format_timestamp(expires_at));
        }
        if let Some(scope) = &status.scope {
            println!("  scope: {scope}");
        }
    } else {
        println!("Gmail: not connected");
        println!("  Run `courier gmail connect` to link an account.");
    }
    if let Some(message) = &status.message {
        println!("  {message}");
    }

    Ok(())
}

/// Waits for the OAuth redirect on a local port and returns its query string.
fn wait_for_redirect(port: u16) -> Option<String> {
    let listener = match TcpListener::bind(("127.0.0.1", port)) {
        Ok(listener) => listener,
        Err(_) => return None,
    };
    let _ = listener.set_nonblocking(true);

    println!("Waiting for the redirect on http://127.0.0.1:{port} ...");

    let (tx, rx) = std::sync::mpsc::channel::<Option<String>>();

    std::thread::spawn(move || {
        let start = std::time::Instant::now();
        loop {
            match listener.accept() {
                Ok((mut stream, _)) => {
                    let mut buffer = [0u8; 2048];
                    let _ = stream.read(&mut buffer);
                    let request = String::from_utf8_lossy(&buffer);
                    let query = extract_query_from_request(&request);
                    let response = match query.is_some() {
                        true => callback_success_response(),
                        false => callback_error_response(),
                    };
                    let _ = stream.write_all(response.as_bytes());
                    let _ = tx.send(query);
                    break;
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    if start.elapsed() > Duration::from_secs(120) {
                        let _ = tx.send(None);
                        break;
                    }
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(_) => {
                    let _ = tx.send(None);
                    break;
                }
            }
        }
    });

    rx.recv_timeout(Duration::from_secs(120)).ok().flatten()
}

/// Pulls the query string with OAuth parameters out of a redirect request.
fn extract_query_from_request(request: &str) -> Option<String> {
    let mut lines = request.lines();
    let request_line = lines.next()?;
    let mut parts = request_line.split_whitespace();
    let _method = parts.next()?;
    let path = parts.next()?;

    let url = url::Url::parse(&format!("http://localhost{path}")).ok()?;
    let query = url.query()?.to_string();

    // Only hand back queries that carry something the exchange can use.
    let data = parse_redirect_input(&query);
    GoogleAuthData::from_callback(data).ok().map(|_| query)
}

fn callback_success_response() -> String {
    let body = "<!doctype html><html><head><meta charset=\"utf-8\" /><title>Gmail connected</title></head><body><p>Authorization received. Return to your terminal to continue.</p></body></html>";
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    )
}

fn callback_error_response() -> String {
    let body = "Invalid OAuth callback";
    format!(
        "HTTP/1.1 400 Bad Request\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Redirect request parsing: query with a code is extracted.
    #[test]
    fn test_extract_query_with_code() {
        let request = "GET /anything/callback?code=4%2Fabc&scope=gmail.send HTTP/1.1\r\nHost: localhost\r\n\r\n";
        let query = extract_query_from_request(request).unwrap();
        assert!(query.contains("code=4%2Fabc"));
    }

    /// Redirect request without usable auth data is rejected.
    #[test]
    fn test_extract_query_without_auth_data() {
        let request = "GET /favicon.ico HTTP/1.1\r\nHost: localhost\r\n\r\n";
        assert_eq!(extract_query_from_request(request), None);

        let request = "GET /cb?state=only HTTP/1.1\r\nHost: localhost\r\n\r\n";
        assert_eq!(extract_query_from_request(request), None);
    }

    /// Provider cancellation in the redirect is not treated as usable data.
    #[test]
    fn test_extract_query_with_error_param() {
        let request = "GET /cb?error=access_denied HTTP/1.1\r\nHost: localhost\r\n\r\n";
        assert_eq!(extract_query_from_request(request), None);
    }
}
