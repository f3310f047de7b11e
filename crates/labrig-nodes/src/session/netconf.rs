//! NETCONF over SSH.
//!
//! Uses NETCONF 1.0 end-of-message framing. The SSH leg is delegated to the
//! system `ssh` client running the `netconf` subsystem, with the password
//! supplied through `sshpass -e`.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use labrig_common::{LabError, LabResult};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::process::Command;

use super::{ManagementSession, SessionTarget};

/// IANA assigned NETCONF over SSH port.
pub const NETCONF_PORT: u16 = 830;

/// NETCONF 1.0 end-of-message marker.
pub const EOM: &str = "]]>]]>";

const BASE_NS: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

/// sshpass exit status for a rejected password.
const SSHPASS_AUTH_FAILED: i32 = 5;

const COPY_CONFIG_ID: u32 = 101;

/// Client `<hello>` message.
#[must_use]
pub fn hello() -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <hello xmlns=\"{BASE_NS}\"><capabilities>\
         <capability>urn:ietf:params:netconf:base:1.0</capability>\
         </capabilities></hello>{EOM}"
    )
}

/// `<copy-config>` RPC from one datastore to another.
#[must_use]
pub fn copy_config(message_id: u32, source: &str, target: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <rpc message-id=\"{message_id}\" xmlns=\"{BASE_NS}\"><copy-config>\
         <target><{target}/></target><source><{source}/></source>\
         </copy-config></rpc>{EOM}"
    )
}

/// `<close-session>` RPC.
#[must_use]
pub fn close_session(message_id: u32) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <rpc message-id=\"{message_id}\" xmlns=\"{BASE_NS}\"><close-session/></rpc>{EOM}"
    )
}

/// Outcome of a single RPC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcReply {
    /// `<ok/>`.
    Ok,
    /// `<rpc-error>` with its error message.
    Error(String),
}

/// Find the reply to `message_id` in a server output stream.
#[must_use]
pub fn find_reply(output: &str, message_id: u32) -> Option<RpcReply> {
    let id_attrs = [
        format!("message-id=\"{message_id}\""),
        format!("message-id='{message_id}'"),
    ];
    let message = output.split(EOM).find(|m| {
        m.contains("rpc-reply") && id_attrs.iter().any(|id| m.contains(id.as_str()))
    })?;

    if message.contains("rpc-error>") {
        let text = element_text(message, "error-message")
            .unwrap_or("unspecified rpc-error")
            .to_string();
        return Some(RpcReply::Error(text));
    }
    if has_empty_element(message, "ok") {
        return Some(RpcReply::Ok);
    }
    Some(RpcReply::Error("unexpected rpc-reply".to_string()))
}

fn has_empty_element(message: &str, name: &str) -> bool {
    [format!("<{name}/>"), format!("<{name} />"), format!(":{name}/>")]
        .iter()
        .any(|tag| message.contains(tag.as_str()))
}

fn element_text<'a>(message: &'a str, name: &str) -> Option<&'a str> {
    let mut offset = 0;
    while let Some(pos) = message[offset..].find('<') {
        let tag = &message[offset + pos + 1..];
        let tag_end = tag.find('>')?;
        let tag_name = tag[..tag_end].split_whitespace().next().unwrap_or_default();
        let local = tag_name.rsplit(':').next().unwrap_or_default();
        if local == name && !tag_name.starts_with('/') {
            let body = &tag[tag_end + 1..];
            return Some(body[..body.find("</")?].trim());
        }
        offset += pos + 1;
    }
    None
}

/// [`ManagementSession`] speaking NETCONF over SSH.
#[derive(Debug, Clone)]
pub struct NetconfSession {
    port: u16,
    connect_timeout: Duration,
}

impl Default for NetconfSession {
    fn default() -> Self {
        Self {
            port: NETCONF_PORT,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl NetconfSession {
    /// Create a session factory with default port and timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the NETCONF port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the TCP connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    async fn probe(&self, address: &str) -> LabResult<()> {
        let connect = TcpStream::connect((address, self.port));
        match tokio::time::timeout(self.connect_timeout, connect).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(LabError::SessionConnect {
                address: address.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(LabError::SessionConnect {
                address: address.to_string(),
                message: format!("no answer within {:?}", self.connect_timeout),
            }),
        }
    }

    fn command(&self, target: &SessionTarget) -> Command {
        let mut cmd = Command::new("sshpass");
        cmd.arg("-e")
            .arg("ssh")
            .args(["-o", "StrictHostKeyChecking=no"])
            .args(["-o", "UserKnownHostsFile=/dev/null"])
            .args(["-o", "LogLevel=ERROR"])
            .arg("-o")
            .arg(format!(
                "ConnectTimeout={}",
                self.connect_timeout.as_secs().max(1)
            ))
            .arg("-p")
            .arg(self.port.to_string())
            .arg("-l")
            .arg(&target.username)
            .arg(&target.address)
            .args(["-s", "netconf"])
            .env("SSHPASS", &target.password)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl ManagementSession for NetconfSession {
    async fn save_running_config(&self, target: &SessionTarget) -> LabResult<()> {
        let connect_err = |message: String| LabError::SessionConnect {
            address: target.address.clone(),
            message,
        };

        self.probe(&target.address).await?;
        tracing::debug!(
            address = %target.address,
            port = self.port,
            platform = %target.platform,
            "Opening NETCONF session"
        );

        let mut child = self
            .command(target)
            .spawn()
            .map_err(|e| connect_err(format!("failed to run sshpass: {e}")))?;

        let input = format!(
            "{}{}{}",
            hello(),
            copy_config(COPY_CONFIG_ID, "running", "startup"),
            close_session(COPY_CONFIG_ID + 1)
        );
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.as_bytes())
                .await
                .map_err(|e| connect_err(e.to_string()))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| connect_err(e.to_string()))?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        match find_reply(&stdout, COPY_CONFIG_ID) {
            Some(RpcReply::Ok) => Ok(()),
            Some(RpcReply::Error(message)) => Err(LabError::SessionRejected {
                address: target.address.clone(),
                message,
            }),
            None if output.status.code() == Some(SSHPASS_AUTH_FAILED) => {
                Err(LabError::SessionAuth {
                    address: target.address.clone(),
                    username: target.username.clone(),
                })
            }
            None => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let message = match stderr.trim() {
                    "" => format!("no reply to copy-config ({})", output.status),
                    err => err.to_string(),
                };
                Err(connect_err(message))
            }
        }
    }
}
