use std::sync::LazyLock;

use glam::Vec3;

static BOX: LazyLock<Vec<Vec3>> = LazyLock::new(|| {
    let mut corners = Vec::with_capacity(8);
    for x in [-0.25, 0.25] {
        for y in [-0.25, 0.25] {
            for z in [-0.25, 0.25] {
                corners.push(Vec3::new(x, y, z));
            }
        }
    }
    corners
});

static CONE: LazyLock<Vec<Vec3>> = LazyLock::new(|| {
    let mut points = vec![Vec3::new(0.0, 0.4, 0.0)];
    points.extend(ring(0.3, 6).map(|p| Vec3::new(p.x, -0.4, p.y)));
    points
});

static OCTAHEDRON: LazyLock<Vec<Vec3>> = LazyLock::new(|| {
    vec![
        Vec3::X * 0.4,
        Vec3::NEG_X * 0.4,
        Vec3::Y * 0.4,
        Vec3::NEG_Y * 0.4,
        Vec3::Z * 0.4,
        Vec3::NEG_Z * 0.4,
    ]
});

static ICOSAHEDRON: LazyLock<Vec<Vec3>> = LazyLock::new(|| icosahedron(0.4));

static TETRAHEDRON: LazyLock<Vec<Vec3>> = LazyLock::new(|| {
    [
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(-1.0, -1.0, 1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(1.0, -1.0, -1.0),
    ]
    .into_iter()
    .map(|v| v.normalize() * 0.5)
    .collect()
});

static SPHERE: LazyLock<Vec<Vec3>> = LazyLock::new(|| {
    let mut points = vec![Vec3::Y * 0.5, Vec3::NEG_Y * 0.5];
    for band in 1..6 {
        let phi = band as f32 / 6.0 * std::f32::consts::PI;
        let y = phi.cos() * 0.5;
        points.extend(ring(phi.sin() * 0.5, 12).map(|p| Vec3::new(p.x, y, p.y)));
    }
    points
});

fn ring(radius: f32, segments: usize) -> impl Iterator<Item = glam::Vec2> {
    (0..segments).map(move |s| {
        let a = s as f32 / segments as f32 * std::f32::consts::TAU;
        glam::Vec2::new(a.cos() * radius, a.sin() * radius)
    })
}

/// The 12 vertices of an icosahedron with circumradius `radius`.
pub fn icosahedron(radius: f32) -> Vec<Vec3> {
    let t = (1.0 + 5f32.sqrt()) / 2.0;
    [
        (-1.0, t, 0.0),
        (1.0, t, 0.0),
        (-1.0, -t, 0.0),
        (1.0, -t, 0.0),
        (0.0, -1.0, t),
        (0.0, 1.0, t),
        (0.0, -1.0, -t),
        (0.0, 1.0, -t),
        (t, 0.0, -1.0),
        (t, 0.0, 1.0),
        (-t, 0.0, -1.0),
        (-t, 0.0, 1.0),
    ]
    .into_iter()
    .map(|(x, y, z)| Vec3::new(x, y, z).normalize() * radius)
    .collect()
}

/// Shape drawn for a single element.
///
/// Elements are drawn as point clouds of their outline, so rotation and scale
/// stay visible without building triangle meshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Point,
    Box,
    Cone,
    Octahedron,
    Icosahedron,
    Tetrahedron,
    Sphere,
}

impl ShapeKind {
    /// Geometric art shape for a complexity level; anything outside 1..=4
    /// falls back to a tetrahedron.
    pub fn from_complexity(complexity: u8) -> Self {
        match complexity {
            1 => ShapeKind::Box,
            2 => ShapeKind::Cone,
            3 => ShapeKind::Octahedron,
            4 => ShapeKind::Icosahedron,
            _ => ShapeKind::Tetrahedron,
        }
    }

    /// Outline points in the shape's local frame, sized like the mesh they
    /// stand in for (a 0.5 box, a 0.3 x 0.8 cone, radius 0.4 polyhedra).
    pub fn outline(self) -> &'static [Vec3] {
        match self {
            ShapeKind::Point => &[Vec3::ZERO],
            ShapeKind::Box => BOX.as_slice(),
            ShapeKind::Cone => CONE.as_slice(),
            ShapeKind::Octahedron => OCTAHEDRON.as_slice(),
            ShapeKind::Icosahedron => ICOSAHEDRON.as_slice(),
            ShapeKind::Tetrahedron => TETRAHEDRON.as_slice(),
            ShapeKind::Sphere => SPHERE.as_slice(),
        }
    }
}

/// Element colour, either a hue on the HSL wheel or explicit linear RGB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    /// Hue in degrees `[0, 360)`, saturation and lightness in `[0, 1]`.
    Hsl { hue: f32, saturation: f32, lightness: f32 },
    Rgb([f32; 3]),
}

impl Color {
    pub fn hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        Color::Hsl {
            hue: hue.rem_euclid(360.0),
            saturation,
            lightness,
        }
    }

    /// Same as [`Color::hsl`] with the hue given in turns (`0.0..1.0`).
    pub fn hsl_turns(turns: f32, saturation: f32, lightness: f32) -> Self {
        Self::hsl(turns.rem_euclid(1.0) * 360.0, saturation, lightness)
    }

    pub fn from_hex(hex: u32) -> Self {
        Color::Rgb([
            ((hex >> 16) & 0xff) as f32 / 255.0,
            ((hex >> 8) & 0xff) as f32 / 255.0,
            (hex & 0xff) as f32 / 255.0,
        ])
    }

    pub fn hue(&self) -> Option<f32> {
        match self {
            Color::Hsl { hue, .. } => Some(*hue),
            Color::Rgb(_) => None,
        }
    }

    pub fn to_rgb(&self) -> [f32; 3] {
        match *self {
            Color::Rgb(rgb) => rgb,
            Color::Hsl {
                hue,
                saturation,
                lightness,
            } => hsl_to_rgb(hue, saturation, lightness),
        }
    }
}

fn hsl_to_rgb(hue: f32, s: f32, l: f32) -> [f32; 3] {
    if s <= 0.0 {
        return [l, l, l];
    }
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let h = hue.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    [r + m, g + m, b + m]
}

/// A single positioned, shaped, coloured unit within an effect collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub position: Vec3,
    /// Euler angles in radians.
    pub rotation: Vec3,
    pub scale: f32,
    pub color: Color,
    pub shape: ShapeKind,
}

impl Element {
    pub fn new(position: Vec3, shape: ShapeKind, color: Color) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
            scale: 1.0,
            color,
            shape,
        }
    }

    pub fn point(position: Vec3, color: Color) -> Self {
        Self::new(position, ShapeKind::Point, color)
    }
}
