use lidar_decode::{decode, normalize, unpack, DecodeOptions};
use std::env;

fn main() -> lidar_decode::Result<()> {
    env_logger::init();
    let path = env::args().nth(1).expect("LAS/LAZ file required");
    let bytes = std::fs::read(&path)?;

    let mut progress = |done: u64, total: u64| println!("{done} / {total} points");
    let cloud = decode(&bytes, &DecodeOptions::default(), &mut progress)?;

    println!("{path}: {} points in {:?}", cloud.point_count, cloud.decode_time);
    if let Err(e) = cloud.check_complete() {
        println!("warning: {e}");
    }
    println!("bounds: {:?}", cloud.bounds);
    println!("scale: {:?} offset: {:?}", cloud.scale, cloud.offset);

    let positions = cloud.decoded_positions();
    let colors = cloud.buffer.colors();
    for (i, xyz) in positions.chunks_exact(3).take(5).enumerate() {
        let mut packed = [0u8; 6];
        packed.copy_from_slice(&colors[i * 6..i * 6 + 6]);
        let rgb = unpack(packed).map(normalize);
        println!("({}, {}, {}) rgb {:?}", xyz[0], xyz[1], xyz[2], rgb);
    }
    Ok(())
}
