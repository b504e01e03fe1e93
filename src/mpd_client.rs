//! # MPD Client Module
//!
//! Hands the assembled playlist to Music Player Daemon through the `mpd`
//! crate's blocking client. [`PlaybackSink`] is the seam the pipeline talks
//! to; [`MpdClient`] is its only real implementation.
//!
//! ## Lifecycle
//!
//! [`MpdClient::connect`] opens the socket and checks the greeting.
//! [`PlaybackSink::disconnect`] sends `close`; dropping an open client does
//! the same on a best-effort basis, so the connection is released on every
//! exit path.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use mpd::{Client, Song};
use std::net::TcpStream;
use std::time::Duration;

/// Where and how to reach MPD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MpdSettings {
    pub host: String,
    pub port: u16,
    /// Sent with `password` right after connecting when set.
    pub password: Option<String>,
}

impl Default for MpdSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6600,
            password: None,
        }
    }
}

/// Queue commands the pipeline issues against the playback daemon.
///
/// Connecting is the implementor's constructor.
pub trait PlaybackSink {
    /// # Errors
    ///
    /// Returns an error if the daemon rejects the password.
    fn authenticate(&mut self, password: &str) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the command fails.
    fn clear_queue(&mut self) -> Result<()>;

    /// Appends a file, given relative to the daemon's music directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the daemon does not know the file.
    fn enqueue(&mut self, relative_path: &str) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the command fails.
    fn play(&mut self) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the command fails.
    fn shuffle_queue(&mut self) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the goodbye cannot be sent.
    fn disconnect(&mut self) -> Result<()>;
}

const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking MPD client.
pub struct MpdClient {
    client: Client<TcpStream>,
    connected: bool,
}

impl MpdClient {
    /// Connects to `host:port` and reads the `OK MPD <version>` greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is refused or the peer is not MPD.
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        let stream = TcpStream::connect((host, port)).with_context(|| {
            format!("Failed to connect to MPD at {host}:{port}. Make sure MPD is running.")
        })?;
        stream
            .set_read_timeout(Some(READ_TIMEOUT))
            .context("Failed to configure MPD socket")?;

        let client = Client::new(stream).with_context(|| format!("Unexpected greeting from {host}:{port}"))?;
        let mpd = Self {
            client,
            connected: true,
        };

        info!("Connected to MPD {} at {host}:{port}", mpd.version());
        Ok(mpd)
    }

    /// Protocol version announced in the greeting.
    #[must_use]
    pub fn version(&self) -> String {
        let version = &self.client.version;
        format!("{}.{}.{}", version.0, version.1, version.2)
    }
}

impl PlaybackSink for MpdClient {
    fn authenticate(&mut self, password: &str) -> Result<()> {
        debug!("MPD <- password ****");
        self.client.login(password).context("MPD authentication failed")
    }

    fn clear_queue(&mut self) -> Result<()> {
        debug!("MPD <- clear");
        self.client.clear().context("MPD refused `clear`")
    }

    fn enqueue(&mut self, relative_path: &str) -> Result<()> {
        debug!("MPD <- add {relative_path:?}");
        let song = Song {
            file: relative_path.to_string(),
            ..Song::default()
        };
        self.client
            .push(song)
            .map(|_| ())
            .with_context(|| format!("MPD refused to add {relative_path:?}"))
    }

    fn play(&mut self) -> Result<()> {
        debug!("MPD <- play");
        self.client.play().context("MPD refused `play`")
    }

    fn shuffle_queue(&mut self) -> Result<()> {
        debug!("MPD <- shuffle");
        self.client.shuffle(..).context("MPD refused `shuffle`")
    }

    fn disconnect(&mut self) -> Result<()> {
        if !self.connected {
            return Ok(());
        }
        self.connected = false;
        // MPD may drop the socket instead of answering `close`.
        if let Err(e) = self.client.close() {
            debug!("MPD close: {e}");
        }
        debug!("Disconnected from MPD");
        Ok(())
    }
}

impl Drop for MpdClient {
    fn drop(&mut self) {
        if self.connected {
            if let Err(e) = self.disconnect() {
                warn!("Failed to close MPD connection: {e}");
            }
        }
    }
}
