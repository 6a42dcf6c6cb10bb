use chrono::{DateTime, Utc};
use log::info;
use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::Path,
};

/// Creates (or truncates) `<folder_path>/<file_name>.yaml`, creating the folder first when needed.
pub fn create_yaml_file(folder_path: &str, file_name: &str) -> io::Result<String> {
    if !Path::new(folder_path).is_dir() {
        fs::create_dir_all(folder_path)?;
        info!("Created output folder {}", folder_path);
    }
    let file_path = format!("{}/{}.yaml", folder_path, file_name);
    fs::File::create(&file_path)?;
    Ok(file_path)
}

/// Creates `<folder_path>/<date>-<name>-log.yaml` and returns its path.
pub fn create_scheduler_log_yaml_file(folder_path: &str, name: &str) -> io::Result<String> {
    let now: DateTime<Utc> = Utc::now();
    let file_name = format!("{}-{}-log", now.format("%Y-%m-%d-%H-%M-%S"), name);
    create_yaml_file(folder_path, &file_name)
}

pub fn append_info_to_yaml(file_path: &str, info: &str) -> io::Result<()> {
    OpenOptions::new()
        .append(true)
        .create(true)
        .open(file_path)?
        .write_all(info.as_bytes())
}
