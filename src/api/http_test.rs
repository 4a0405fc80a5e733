use std::io::Cursor;

use super::*;

fn encoded(width: u32, height: u32, format: image::ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::RgbImage::new(width, height)
        .write_to(&mut Cursor::new(&mut bytes), format)
        .unwrap();
    bytes
}

fn store(base: &str) -> HttpStore {
    HttpStore::new(base, HttpTimeouts { request_secs: 5, connect_secs: 1 }).unwrap()
}

#[test]
fn decode_dimensions_png() {
    assert_eq!(decode_dimensions(&encoded(640, 480, image::ImageFormat::Png)).unwrap(), (640, 480));
}

#[test]
fn decode_dimensions_jpeg() {
    assert_eq!(decode_dimensions(&encoded(17, 9, image::ImageFormat::Jpeg)).unwrap(), (17, 9));
}

#[test]
fn decode_dimensions_rejects_garbage() {
    assert!(matches!(decode_dimensions(b"definitely not an image"), Err(ApiError::Image(_))));
}

#[test]
fn image_url_uses_static_path() {
    let image = ImageRef { id: "i1".into(), file_path: "abc.jpg".into(), filename: "cat.jpg".into() };
    assert_eq!(store("http://localhost:8000/").image_url("p1", &image), "http://localhost:8000/static/p1/images/abc.jpg");
}

#[test]
fn endpoint_urls_join_without_double_slash() {
    let s = store("http://host:1/");
    assert_eq!(s.url("/projects/p1/classes"), "http://host:1/projects/p1/classes");
}
