use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

pub mod logger {
    use super::*;

    pub const LOG_PATH: &str = "logs/market.log";

    pub fn log_new_line(line: &str) -> std::io::Result<()> {
        let path = Path::new(LOG_PATH);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .append(true)
            .create(true)
            .open(path)?;

        write!(file, "{}", line)?;
        Ok(())
    }
}
