#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::time::Duration;

use httpmock::MockServer;
use roboflow::api::ApiClient;
use roboflow::{ClientConfig, PollConfig, Version, VersionId};
use zip::write::SimpleFileOptions;

pub const API_KEY: &str = "test-api-key";

/// Client settings pointed at `server`, with no sleeping between polls.
pub fn instant_config(server: &MockServer, max_attempts: u32) -> ClientConfig {
    ClientConfig::default()
        .with_api_url(server.base_url())
        .with_poll(PollConfig {
            max_attempts,
            initial_interval: Duration::ZERO,
            max_interval: Duration::ZERO,
        })
}

pub fn test_version(server: &MockServer, version: u32) -> Version {
    let api = ApiClient::new(API_KEY, &instant_config(server, 3)).expect("create client");
    let id: VersionId = format!("test-workspace/test-project/{version}")
        .parse()
        .expect("parse version id");
    Version::new(api, id, "Test Dataset")
}

pub fn zip_bytes(files: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, contents) in files {
        writer.start_file(*name, options).expect("start zip entry");
        writer
            .write_all(contents.as_bytes())
            .expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

/// A small YOLO-style export.
pub fn yolo_export() -> Vec<u8> {
    zip_bytes(&[
        (
            "data.yaml",
            "train: ../train/images\nval: ../valid/images\nnc: 1\nnames: ['helmet']\n",
        ),
        ("train/labels/img_a.txt", "0 0.5 0.5 0.2 0.2\n"),
        ("valid/labels/img_b.txt", "0 0.4 0.4 0.1 0.1\n"),
        ("README.roboflow.txt", "Exported for tests\n"),
    ])
}

pub fn project_body() -> serde_json::Value {
    serde_json::json!({
        "workspace": {"name": "Test Workspace", "url": "test-workspace", "members": 2},
        "project": {
            "id": "test-workspace/test-project",
            "name": "Test Dataset",
            "type": "object-detection",
            "versions": 2
        },
        "versions": [
            {"id": "test-workspace/test-project/2", "name": "raw", "exports": []},
            {"id": "test-workspace/test-project/3", "name": "augmented", "exports": ["coco"]}
        ]
    })
}
