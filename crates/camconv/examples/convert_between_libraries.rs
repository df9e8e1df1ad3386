//! Convert an OpenCV-style calibrated camera to PyTorch3D, OpenGL and Open3D.
//!
//! This example demonstrates:
//! - building screen-space perspective cameras from focal length and image size,
//! - placing them with a look-at pose,
//! - converting the batch to other conventions and spaces,
//! - checking that a scene point lands on the same pixel everywhere.

use anyhow::Result;
use camconv::core::look_at_view_transform;
use camconv::prelude::*;

fn main() -> Result<()> {
    let registry = ConventionRegistry::builtin();
    let cv = registry.get("opencv")?;

    let (r, t) = look_at_view_transform(
        &Pt3::new(1.0, -0.5, -4.0),
        &Pt3::origin(),
        &Vec3::new(0.0, -1.0, 0.0),
        cv,
    )?;
    let cams = CameraBuilder::new(CameraKind::Perspective)
        .focal_length(vec![Vec2::new(900.0, 900.0)])
        .principal_point(vec![Vec2::new(640.0, 360.0)])
        .image_size(ImageSize::new(720, 1280))
        .in_ndc(false)
        .r(vec![r])
        .t(vec![t])
        .build()?;

    let point = Pt3::new(0.2, 0.1, 0.3);
    let pixel = cams.transform_points(&[vec![point]])?[0][0];
    println!("opencv (screen): pixel = ({:.3}, {:.3})", pixel.x, pixel.y);

    for (name, in_ndc) in [("pytorch3d", true), ("opengl", true), ("open3d", false)] {
        let dst = registry.get(name)?;
        let converted = cams.to_convention(dst, in_ndc, None)?;
        let local = convert_points(&[point], cv, dst);
        let uv = converted.transform_points_screen(&[local])?[0][0];
        println!(
            "{name:>9} ({}): K =\n{}  pixel = ({:.3}, {:.3})",
            if in_ndc { "ndc" } else { "screen" },
            converted.batch().k()[0],
            uv.x,
            uv.y
        );
    }
    Ok(())
}
