//! In-memory fixtures shaped like the npm mirror's responses

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

/// Builds a zip archive in memory
///
/// Each entry is `(path, contents)`. Paths ending in `/` become directory
/// entries; parent directories of files are implied, as in real archives.
///
/// # Examples
///
/// ```rust
/// use cdm_testkit::driver_zip;
///
/// let bytes = driver_zip(&[
///     ("chromedriver-linux64/", b""),
///     ("chromedriver-linux64/chromedriver", b"#!/bin/sh\n"),
///     ("chromedriver-linux64/LICENSE.chromedriver", b"license"),
/// ]);
/// assert!(!bytes.is_empty());
/// ```
pub fn driver_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    for (name, contents) in entries {
        if name.ends_with('/') {
            zip.add_directory(name.trim_end_matches('/'), options)
                .expect("Failed to add directory entry");
        } else {
            zip.start_file(*name, options)
                .expect("Failed to start zip entry");
            zip.write_all(contents).expect("Failed to write zip entry");
        }
    }

    zip.finish().expect("Failed to finish zip").into_inner()
}

/// Builds a version index body: a JSON array of `{"name", "type"}` objects
///
/// Names are used verbatim, so pass the trailing `/` the mirror uses for
/// version directories (`"114.0.5735.90/"`).
pub fn index_body(names: &[&str]) -> String {
    let entries: Vec<serde_json::Value> = names
        .iter()
        .map(|name| {
            serde_json::json!({
                "id": name.trim_end_matches('/'),
                "category": "chromedriver",
                "name": name,
                "date": "2023-06-13T12:00:00Z",
                "type": "dir",
                "url": format!("https://registry.npmmirror.com/-/binary/chromedriver/{}", name),
                "modified": "2023-06-13T12:00:00Z",
            })
        })
        .collect();

    serde_json::Value::Array(entries).to_string()
}
