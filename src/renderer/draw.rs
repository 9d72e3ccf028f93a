//! Scene drawing

use glam::IVec2;

use super::canvas::{Canvas, Rgb, colors};
use crate::sim::{MotionEntity, Population};

/// Draw one ball at its truncated integer position and radius
pub fn draw_entity<C: Canvas + ?Sized>(canvas: &mut C, entity: &MotionEntity) {
    let center = IVec2::new(entity.pos.x as i32, entity.pos.y as i32);
    canvas.fill_circle(center, entity.radius as i32, Rgb::from(entity.color));
}

/// Clear and draw the whole population in index order
pub fn draw_population<C: Canvas + ?Sized>(canvas: &mut C, population: &Population) {
    canvas.clear(colors::BACKGROUND);
    for entity in &population.entities {
        draw_entity(canvas, entity);
    }
}
