//! Command-line surface.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use sentinel_core::control::CameraAction;
use sentinel_core::types::DbId;

#[derive(Debug, Parser)]
#[command(
    name = "sentinel",
    about = "UrbanSentinel monitoring client: cameras, live video, incidents and reports",
    version
)]
pub struct Cli {
    /// Print raw JSON instead of formatted text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SENTINEL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session.
    Logout,
    /// Create a WORKER account and sign in with it.
    Register(RegisterArgs),
    /// Change the password of an account.
    ChangePassword {
        #[arg(long)]
        email: String,
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
    },
    /// Check whether a password reset token is still valid.
    ResetToken { token: String },
    /// Camera connections.
    #[command(subcommand)]
    Cameras(CamerasCommand),
    /// List branch offices.
    Offices,
    /// Follow a camera live: receive frames for RTSP cameras, push local
    /// frames for webcam cameras.
    Watch(WatchArgs),
    /// Push local frames to a camera's ingest endpoint.
    Ingest(IngestArgs),
    /// List detected events.
    Events {
        #[arg(long = "connection", value_name = "id")]
        connection: Option<DbId>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
    },
    /// Recorded clips.
    #[command(subcommand)]
    Clips(ClipsCommand),
    /// Notifications.
    #[command(subcommand)]
    Notifications(NotificationsCommand),
    /// Daily event report over a date range.
    Report(ReportArgs),
    /// User administration (ADMIN only).
    #[command(subcommand)]
    Users(UsersCommand),
    /// Send an SMS alert.
    Alert { message: String, phone: String },
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "SENTINEL_PASSWORD", hide_env_values = true)]
    pub password: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long, default_value = "")]
    pub nombre: String,
    #[arg(long, default_value = "")]
    pub apellido: String,
}

#[derive(Debug, Subcommand)]
pub enum CamerasCommand {
    /// List camera connections.
    List,
    /// Register a camera. Use `webcam` as the URL for a local webcam.
    Create {
        #[arg(long)]
        office: DbId,
        #[arg(long)]
        name: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        url: String,
    },
    /// Mark a connection active or inactive.
    State {
        id: DbId,
        #[arg(action = clap::ArgAction::Set)]
        active: bool,
    },
    /// Enable or disable a connection.
    Enable {
        id: DbId,
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// Send a command to the stream server
    /// (start, stop, enable_inference, disable_inference).
    Control { camera_id: String, action: CameraAction },
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    pub connection_id: DbId,
    /// Where the latest frame is written.
    #[arg(long, value_name = "file")]
    pub out: Option<PathBuf>,
    /// Stop after this many frames (runs until Ctrl-C when omitted).
    #[arg(long)]
    pub frames: Option<u64>,
    /// Image directory replayed for webcam cameras.
    #[arg(long, value_name = "path")]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct IngestArgs {
    pub camera_id: String,
    /// Replay still images from this directory instead of a test pattern.
    #[arg(long, value_name = "path")]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum ClipsCommand {
    List,
    Show {
        id: DbId,
        /// Also fetch the per-frame inference log of the clip's events.
        #[arg(long)]
        log: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum NotificationsCommand {
    List,
    /// Stay connected and print notifications as they arrive.
    Follow {
        recipient: String,
        /// Ring the terminal bell on each notification.
        #[arg(long)]
        bell: bool,
    },
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// First day (YYYY-MM-DD). Defaults to the earliest event.
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Last day (YYYY-MM-DD). Defaults to the latest event.
    #[arg(long)]
    pub to: Option<NaiveDate>,
    /// Write the CSV export into this directory.
    #[arg(long, value_name = "dir")]
    pub csv: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    List,
    Delete { id: DbId },
}
