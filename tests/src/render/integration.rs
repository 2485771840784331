#![cfg(test)]
use std::io::Cursor;
use std::net::Ipv4Addr;

use image::{ImageFormat, Rgba, RgbaImage};
use ipmap_common::config::Palette;
use ipmap_common::network::range::AddressRange;
use ipmap_core::hilbert::HilbertMapper;
use ipmap_core::ingest::Records;
use ipmap_core::render::Renderer;

const STREAM: &str = "\
# ipmap interchange v1: status protocol port address timestamp
up tcp 80 193.5.16.4 1610000000
up tcp 443 193.5.18.200 1610000003
#up tcp 22 193.5.17.1 1610000004
down tcp 8080 193.5.17.2 1610000005
up tcp 80 10.0.0.1 1610000006
not a record at all
";

fn render_stream(stream: &str, range: &AddressRange) -> Vec<u8> {
    let mapper = HilbertMapper::new(range.side()).expect("side of an even prefix is a power of two");
    let renderer = Renderer::new(range, &mapper, Palette::default()).unwrap();
    let mut png: Vec<u8> = Vec::new();
    renderer
        .render(Records::new(Cursor::new(stream)), &mut png)
        .unwrap();
    png
}

fn decode(png: &[u8]) -> RgbaImage {
    image::load_from_memory_with_format(png, ImageFormat::Png)
        .unwrap()
        .to_rgba8()
}

/// Two up hosts inside a /22 light exactly two of the 1024 pixels.
#[test]
fn two_up_records_in_a_slash_22() {
    let range: AddressRange = "193.5.16.0/22".parse().unwrap();
    let image = decode(&render_stream(STREAM, &range));

    assert_eq!(image.dimensions(), (32, 32));

    let palette = Palette::default();
    let up = Rgba(palette.up.to_rgba());
    let down = Rgba(palette.down.to_rgba());
    let up_count = image.pixels().filter(|p| **p == up).count();
    let down_count = image.pixels().filter(|p| **p == down).count();

    assert_eq!(up_count, 2);
    assert_eq!(down_count, 1022);

    let mapper = HilbertMapper::new(32).unwrap();
    for addr in [Ipv4Addr::new(193, 5, 16, 4), Ipv4Addr::new(193, 5, 18, 200)] {
        let offset = range.offset_of(addr).unwrap();
        let (x, y) = mapper.map(offset).unwrap();
        assert_eq!(*image.get_pixel(x, y), up, "{addr} should be painted");
    }
}

#[test]
fn rendering_is_deterministic() {
    let range: AddressRange = "193.5.16.0/22".parse().unwrap();
    let first = render_stream(STREAM, &range);
    let second = render_stream(STREAM, &range);
    assert_eq!(first, second);
}

#[test]
fn host_bits_in_the_range_are_ignored() {
    let masked: AddressRange = "193.5.16.0/22".parse().unwrap();
    let unmasked: AddressRange = "193.5.17.99/22".parse().unwrap();
    assert_eq!(render_stream(STREAM, &masked), render_stream(STREAM, &unmasked));
}

#[test]
fn empty_stream_is_all_background() {
    let range: AddressRange = "10.0.0.0/24".parse().unwrap();
    let image = decode(&render_stream("", &range));
    let down = Rgba(Palette::default().down.to_rgba());
    assert!(image.pixels().all(|p| *p == down));
    assert_eq!(image.dimensions(), (16, 16));
}
