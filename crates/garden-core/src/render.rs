//! Renderer and the drawing-surface contract
//!
//! The renderer works in logical units. It scales the surface by the
//! device pixel ratio before drawing and back afterwards, so surfaces see a
//! balanced pair of `scale` calls around every frame.

use crate::physics::Connection;
use crate::{Bounds, Error, Point, Rarity, Result, SimNode};
use serde::{Deserialize, Serialize};

/// An RGBA colour with straight alpha in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Same colour with a different alpha
    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }
}

/// Fill colour of a rarity tier
pub fn rarity_color(rarity: Rarity) -> Color {
    match rarity {
        Rarity::Legendary => Color::rgb(0xff, 0xd7, 0x00),
        Rarity::Rare => Color::rgb(0x3b, 0x82, 0xf6),
        Rarity::Common => Color::rgb(0x48, 0xbb, 0x78),
        Rarity::Unknown => Color::rgb(0x9c, 0xa3, 0xaf),
    }
}

/// A drawing surface in logical units
pub trait Surface {
    /// Current logical size, or None while the surface is detached or unsized
    fn size(&self) -> Option<Bounds>;

    /// Physical pixels per logical unit
    fn pixel_ratio(&self) -> f64 {
        1.0
    }

    /// Erase everything drawn so far
    fn clear(&mut self);

    /// Multiply the current transform by a uniform scale
    fn scale(&mut self, factor: f64);

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color);

    fn stroke_circle(&mut self, center: Point, radius: f64, width: f64, color: Color);

    fn line(&mut self, from: Point, to: Point, width: f64, color: Color);

    /// Flush the finished frame
    fn present(&mut self) -> Result<()> {
        Ok(())
    }
}

/// How plants are drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeStyle {
    pub radius: f64,
    /// Outer ring drawn around legendary plants
    pub legendary_ring_radius: f64,
    pub legendary_ring_width: f64,
    pub legendary_ring_color: Color,
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self {
            radius: 10.0,
            legendary_ring_radius: 12.0,
            legendary_ring_width: 3.0,
            legendary_ring_color: Color::rgba(255, 215, 0, 0.3),
        }
    }
}

/// How proximity links are inferred and drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkStyle {
    /// Distance under which two plants are linked
    pub threshold: f64,
    /// Alpha of a link between two coincident plants
    pub max_opacity: f64,
    pub width: f64,
    pub color: Color,
}

impl Default for LinkStyle {
    fn default() -> Self {
        Self {
            threshold: 150.0,
            max_opacity: 0.2,
            width: 1.0,
            color: Color::WHITE,
        }
    }
}

/// Draws the garden onto a [`Surface`]
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    nodes: NodeStyle,
    links: LinkStyle,
}

impl Renderer {
    pub fn new(nodes: NodeStyle, links: LinkStyle) -> Self {
        Self { nodes, links }
    }

    pub fn link_style(&self) -> &LinkStyle {
        &self.links
    }

    /// Draw one full frame
    ///
    /// Links go underneath the plants. Fails with `SurfaceUnavailable`
    /// without touching the surface when it has no size.
    pub fn render<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        nodes: &[&SimNode],
        connections: &[Connection],
    ) -> Result<()> {
        if surface.size().is_none() {
            return Err(Error::SurfaceUnavailable);
        }

        let ratio = surface.pixel_ratio();
        let ratio = if ratio > 0.0 { ratio } else { 1.0 };

        surface.clear();
        surface.scale(ratio);

        for link in connections {
            let (Some(a), Some(b)) = (nodes.get(link.a), nodes.get(link.b)) else {
                continue;
            };
            let color = self.links.color.with_alpha(link.weight * self.links.max_opacity);
            surface.line(a.position(), b.position(), self.links.width, color);
        }

        for node in nodes {
            let center = node.position();
            surface.fill_circle(center, self.nodes.radius, rarity_color(node.plant.rarity));
            if node.plant.rarity == Rarity::Legendary {
                surface.stroke_circle(
                    center,
                    self.nodes.legendary_ring_radius,
                    self.nodes.legendary_ring_width,
                    self.nodes.legendary_ring_color,
                );
            }
        }

        surface.scale(1.0 / ratio);
        surface.present()
    }
}

/// A single recorded drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Scale(f64),
    FillCircle {
        center: Point,
        radius: f64,
        color: Color,
    },
    StrokeCircle {
        center: Point,
        radius: f64,
        width: f64,
        color: Color,
    },
    Line {
        from: Point,
        to: Point,
        width: f64,
        color: Color,
    },
    Present,
}

/// Surface that records calls instead of drawing
///
/// Useful for tests and headless runs. `clear` drops everything recorded
/// before it, so after a frame the log holds exactly that frame.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    size: Option<Bounds>,
    pixel_ratio: f64,
    commands: Vec<DrawCommand>,
    frames: u64,
}

impl RecordingSurface {
    pub fn new(size: Bounds) -> Self {
        Self {
            size: Some(size),
            pixel_ratio: 1.0,
            commands: Vec::new(),
            frames: 0,
        }
    }

    /// A surface that has not been laid out yet
    pub fn detached() -> Self {
        Self {
            size: None,
            pixel_ratio: 1.0,
            ..Self::default()
        }
    }

    pub fn with_pixel_ratio(mut self, ratio: f64) -> Self {
        self.pixel_ratio = ratio;
        self
    }

    pub fn resize(&mut self, size: Option<Bounds>) {
        self.size = size;
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of frames presented
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Net scale applied by the recorded commands
    pub fn net_scale(&self) -> f64 {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Scale(f) => Some(*f),
                _ => None,
            })
            .product()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Option<Bounds> {
        self.size
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn scale(&mut self, factor: f64) {
        self.commands.push(DrawCommand::Scale(factor));
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, width: f64, color: Color) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            width,
            color,
        });
    }

    fn line(&mut self, from: Point, to: Point, width: f64, color: Color) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
        });
    }

    fn present(&mut self) -> Result<()> {
        self.commands.push(DrawCommand::Present);
        self.frames += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::connections;
    use crate::Plant;

    fn node(id: &str, rarity: Rarity, x: f64, y: f64) -> SimNode {
        SimNode::at(Plant::new(id, "fern", rarity), Point::new(x, y))
    }

    #[test]
    fn test_rarity_colors() {
        assert_eq!(rarity_color(Rarity::Legendary), Color::rgb(255, 215, 0));
        assert_eq!(rarity_color(Rarity::Rare), Color::rgb(59, 130, 246));
        assert_eq!(rarity_color(Rarity::Common), Color::rgb(72, 187, 120));
        assert_eq!(rarity_color(Rarity::Unknown), Color::rgb(156, 163, 175));
    }

    #[test]
    fn test_render_frame() {
        let nodes = [
            node("a", Rarity::Common, 100.0, 100.0),
            node("b", Rarity::Legendary, 160.0, 180.0),
            node("c", Rarity::Rare, 700.0, 500.0),
        ];
        let refs: Vec<&SimNode> = nodes.iter().collect();
        let links = connections(&refs, 150.0);
        let mut surface = RecordingSurface::new(Bounds::new(800.0, 600.0)).with_pixel_ratio(2.0);

        Renderer::default().render(&mut surface, &refs, &links).unwrap();

        let commands = surface.commands();
        assert_eq!(commands.first(), Some(&DrawCommand::Clear));
        assert_eq!(commands[1], DrawCommand::Scale(2.0));
        assert_eq!(commands.last(), Some(&DrawCommand::Present));
        assert_eq!(surface.net_scale(), 1.0);

        let fills = commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillCircle { .. }))
            .count();
        let rings = commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::StrokeCircle { .. }))
            .count();
        assert_eq!(fills, 3);
        assert_eq!(rings, 1);

        // a-b are 100 apart: weight 1/3, alpha 0.2/3
        let line = commands
            .iter()
            .find_map(|c| match c {
                DrawCommand::Line { color, .. } => Some(*color),
                _ => None,
            })
            .unwrap();
        assert!((line.a - 0.2 / 3.0).abs() < 1e-9);
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn test_render_clears_previous_frame() {
        let nodes = [node("a", Rarity::Common, 10.0, 10.0)];
        let refs: Vec<&SimNode> = nodes.iter().collect();
        let mut surface = RecordingSurface::new(Bounds::new(100.0, 100.0));
        let renderer = Renderer::default();

        renderer.render(&mut surface, &refs, &[]).unwrap();
        let first = surface.commands().len();
        renderer.render(&mut surface, &refs, &[]).unwrap();

        assert_eq!(surface.commands().len(), first);
        assert_eq!(surface.frames(), 2);
    }

    #[test]
    fn test_render_skips_detached_surface() {
        let mut surface = RecordingSurface::detached();
        let result = Renderer::default().render(&mut surface, &[], &[]);

        assert!(matches!(result, Err(Error::SurfaceUnavailable)));
        assert!(surface.commands().is_empty());
    }
}
