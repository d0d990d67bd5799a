use std::path::PathBuf;

use image::{Rgba, RgbaImage};

use facecheck_core::overlay::domain::display_surface::{DisplaySurface, LayerId};
use facecheck_core::overlay::domain::outline_shape::OutlineShape;
use facecheck_core::shared::geometry::Rect;

const BACKGROUND: Rgba<u8> = Rgba([24, 24, 24, 255]);

/// Display surface for a terminal session.
///
/// Tracks attached outlines and, when given a directory, writes each
/// committed overlay as a PNG the size of the preview frame.
pub struct SnapshotSurface {
    next_id: u64,
    layers: Vec<(LayerId, OutlineShape)>,
    frame: Rect,
    output_dir: Option<PathBuf>,
    snapshots: usize,
}

impl SnapshotSurface {
    pub fn new(output_dir: Option<PathBuf>) -> Self {
        Self {
            next_id: 0,
            layers: Vec::new(),
            frame: Rect::default(),
            output_dir,
            snapshots: 0,
        }
    }

    pub fn snapshots(&self) -> usize {
        self.snapshots
    }

    fn write_snapshot(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let Some(dir) = &self.output_dir else {
            return Ok(());
        };
        let width = self.frame.width.round() as u32;
        let height = self.frame.height.round() as u32;
        if width == 0 || height == 0 {
            return Ok(());
        }

        std::fs::create_dir_all(dir)?;
        let shapes: Vec<_> = self.layers.iter().map(|(_, shape)| *shape).collect();
        let path = dir.join(format!("overlay_{:05}.png", self.snapshots));
        rasterize(&shapes, width, height).save(&path)?;
        self.snapshots += 1;
        Ok(())
    }
}

impl DisplaySurface for SnapshotSurface {
    fn add_sublayer(&mut self, shape: &OutlineShape) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        self.layers.push((id, *shape));
        id
    }

    fn remove_from_superlayer(&mut self, id: LayerId) {
        self.layers.retain(|(layer, _)| *layer != id);
    }

    fn preview_frame_changed(&mut self, frame: Rect) {
        if frame != self.frame {
            log::debug!("Preview frame {}x{}", frame.width, frame.height);
        }
        self.frame = frame;
    }

    fn commit(&mut self) {
        log::debug!("Overlay now shows {} outline(s)", self.layers.len());
        if let Err(e) = self.write_snapshot() {
            log::warn!("Failed to write overlay snapshot: {e}");
        }
    }
}

/// Draws outline strokes over a flat background.
pub fn rasterize(shapes: &[OutlineShape], width: u32, height: u32) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(width, height, BACKGROUND);
    for shape in shapes {
        draw_outline(&mut canvas, shape);
    }
    canvas
}

fn draw_outline(canvas: &mut RgbaImage, shape: &OutlineShape) {
    let stroke = Rgba(shape.stroke.to_rgba8());
    let thickness = shape.line_width.round().max(1.0) as i64;
    let left = shape.rect.x.round() as i64;
    let top = shape.rect.y.round() as i64;
    let right = shape.rect.max_x().round() as i64 - 1;
    let bottom = shape.rect.max_y().round() as i64 - 1;
    if right < left || bottom < top {
        return;
    }

    let inner = thickness - 1;
    fill_band(canvas, left, top, right, (top + inner).min(bottom), stroke);
    fill_band(canvas, left, (bottom - inner).max(top), right, bottom, stroke);
    fill_band(canvas, left, top, (left + inner).min(right), bottom, stroke);
    fill_band(canvas, (right - inner).max(left), top, right, bottom, stroke);
}

/// Fills the inclusive box `[x0, x1] x [y0, y1]`, clipped to the canvas.
fn fill_band(canvas: &mut RgbaImage, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgba<u8>) {
    let x0 = x0.max(0);
    let y0 = y0.max(0);
    let x1 = x1.min(canvas.width() as i64 - 1);
    let y1 = y1.min(canvas.height() as i64 - 1);
    for y in y0..=y1 {
        for x in x0..=x1 {
            canvas.put_pixel(x as u32, y as u32, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facecheck_core::overlay::domain::color::Color;

    fn outline(x: f64, y: f64, w: f64, h: f64) -> OutlineShape {
        OutlineShape::outline(Rect::new(x, y, w, h), Color::GREEN)
    }

    #[test]
    fn test_rasterize_strokes_edges_only() {
        let canvas = rasterize(&[outline(2.0, 2.0, 5.0, 5.0)], 10, 10);

        let green = Rgba([0, 255, 0, 255]);
        assert_eq!(*canvas.get_pixel(2, 2), green);
        assert_eq!(*canvas.get_pixel(6, 4), green);
        assert_eq!(*canvas.get_pixel(4, 6), green);
        assert_eq!(*canvas.get_pixel(4, 4), BACKGROUND);
        assert_eq!(*canvas.get_pixel(0, 0), BACKGROUND);
    }

    #[test]
    fn test_rasterize_clips_to_canvas() {
        let canvas = rasterize(&[outline(-5.0, -5.0, 30.0, 30.0)], 10, 10);
        assert_eq!(*canvas.get_pixel(5, 5), BACKGROUND);
    }

    #[test]
    fn test_thick_stroke_covers_band_width() {
        let mut shape = outline(0.0, 0.0, 10.0, 10.0);
        shape.line_width = 3.0;
        let canvas = rasterize(&[shape], 10, 10);

        let green = Rgba([0, 255, 0, 255]);
        assert_eq!(*canvas.get_pixel(2, 5), green);
        assert_eq!(*canvas.get_pixel(7, 5), green);
        assert_eq!(*canvas.get_pixel(5, 7), green);
        assert_eq!(*canvas.get_pixel(3, 5), BACKGROUND);
        assert_eq!(*canvas.get_pixel(5, 6), BACKGROUND);
    }

    #[test]
    fn test_huge_outline_draws_only_visible_edges() {
        // Spans millions of pixels; only the on-canvas edge is touched.
        let canvas = rasterize(&[outline(5.0, -1.0e7, 1.0e7, 2.0e7)], 10, 10);

        let green = Rgba([0, 255, 0, 255]);
        assert_eq!(*canvas.get_pixel(5, 0), green);
        assert_eq!(*canvas.get_pixel(5, 9), green);
        assert_eq!(*canvas.get_pixel(6, 5), BACKGROUND);
        assert_eq!(*canvas.get_pixel(4, 5), BACKGROUND);
    }

    #[test]
    fn test_removed_layers_are_not_drawn() {
        let mut surface = SnapshotSurface::new(None);
        let a = surface.add_sublayer(&outline(0.0, 0.0, 1.0, 1.0));
        surface.add_sublayer(&outline(1.0, 1.0, 1.0, 1.0));

        surface.remove_from_superlayer(a);

        assert_eq!(surface.layers.len(), 1);
    }

    #[test]
    fn test_commit_writes_png_per_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut surface = SnapshotSurface::new(Some(dir.path().to_path_buf()));
        surface.preview_frame_changed(Rect::new(0.0, 0.0, 20.0, 40.0));
        surface.add_sublayer(&outline(1.0, 1.0, 5.0, 5.0));

        surface.commit();
        surface.commit();

        assert_eq!(surface.snapshots(), 2);
        let img = image::open(dir.path().join("overlay_00001.png")).unwrap();
        assert_eq!((img.width(), img.height()), (20, 40));
    }

    #[test]
    fn test_commit_without_frame_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut surface = SnapshotSurface::new(Some(dir.path().to_path_buf()));

        surface.commit();

        assert_eq!(surface.snapshots(), 0);
    }
}
