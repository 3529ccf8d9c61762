use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Browse, edit and chart yearly player statistics kept in an Excel workbook
#[derive(Parser, Debug, Clone)]
#[command(name = "player-sheets", version, about)]
pub struct Config {
    /// Workbook holding the 2024, 2023 and 2022 sheets
    #[arg(long, env = "PLAYER_SHEETS_WORKBOOK", default_value = "final.xlsx")]
    pub workbook: PathBuf,

    /// Address the web interface listens on
    #[arg(long, env = "PLAYER_SHEETS_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Chart width in pixels
    #[arg(long, default_value_t = 800)]
    pub plot_width: u32,

    /// Chart height in pixels
    #[arg(long, default_value_t = 600)]
    pub plot_height: u32,
}
