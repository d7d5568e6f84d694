//! Project a recorded kill line onto the unit viewport.
//!
//! The camera pose and the two event positions below are in the z-up
//! source convention of the recording; the adapter remaps them onto the
//! canonical camera frame before projecting.

use clip_geom::FrameAdapter;
use nalgebra::Point3;

fn main() {
    // Spectator camera pose taken from one tick of the recording.
    let adapter = FrameAdapter::from_angles(
        Point3::new(-480.0, 1260.0, 166.0), // eye position, z is height
        -38.0,                              // yaw, degrees
        -3.5,                               // pitch, degrees
        90.0,
        16.0 / 9.0,
        1.0,
        4000.0,
    );

    // Attacker and victim positions from the kill event.
    let attacker = Point3::new(-210.0, 980.0, 130.0);
    let victim = Point3::new(620.0, 240.0, 64.0);

    let line = adapter.project_line(&attacker, &victim);

    println!("kill line is {:?}", line.visibility);
    for (name, endpoint) in [("attacker", &line.from), ("victim", &line.to)] {
        println!(
            "{:>8}: screen ({:.3}, {:.3}) at {:.1} units, {:?}",
            name, endpoint.position.x, endpoint.position.y, endpoint.distance, endpoint.visibility,
        );
    }
}
