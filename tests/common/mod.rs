#![allow(dead_code)]

use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};
use shapefile::{Point, Polygon, PolygonRing};
use std::fs;
use std::io::{Cursor, Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread::{self, JoinHandle};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Axis-aligned square with a clockwise outer ring.
pub fn square(x0: f64, y0: f64, side: f64) -> Polygon {
    Polygon::new(PolygonRing::Outer(vec![
        Point::new(x0, y0),
        Point::new(x0, y0 + side),
        Point::new(x0 + side, y0 + side),
        Point::new(x0 + side, y0),
        Point::new(x0, y0),
    ]))
}

/// Writes `fires.shp` (+ .shx/.dbf) with one `Incid_Name` per polygon.
pub fn write_fires(dir: &Path, fires: &[(&str, Polygon)]) {
    fs::create_dir_all(dir).unwrap();
    let builder = TableWriterBuilder::new()
        .add_character_field(FieldName::try_from("Incid_Name").unwrap(), 50);
    let mut writer = shapefile::Writer::from_path(dir.join("fires.shp"), builder).unwrap();

    for (name, polygon) in fires {
        let mut record = Record::default();
        record.insert(
            "Incid_Name".to_string(),
            FieldValue::Character(Some(name.to_string())),
        );
        writer.write_shape_and_record(polygon, &record).unwrap();
    }
}

/// Zips every file directly under `dir` into `prefix/<name>`.
pub fn zip_dir(dir: &Path, prefix: &str) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    zip.add_directory(format!("{}/", prefix), options).unwrap();

    let mut entries: Vec<_> = fs::read_dir(dir).unwrap().map(|e| e.unwrap().path()).collect();
    entries.sort();
    for path in entries {
        let name = path.file_name().unwrap().to_str().unwrap().to_string();
        zip.start_file(format!("{}/{}", prefix, name), options).unwrap();
        zip.write_all(&fs::read(&path).unwrap()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Serves a single HTTP response, then exits.
pub fn serve_once(status: &'static str, body: Vec<u8>) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        write!(
            stream,
            "HTTP/1.1 {}\r\nContent-Type: application/zip\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status,
            body.len()
        )
        .unwrap();
        stream.write_all(&body).unwrap();
    });

    (format!("http://{}/perimeters.zip", addr), handle)
}
