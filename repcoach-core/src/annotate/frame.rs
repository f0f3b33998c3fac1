use anyhow::{Result, bail};

/// Colour in the frame's channel order: blue, green, red.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bgr(pub u8, pub u8, pub u8);

impl Bgr {
    pub const BLACK: Bgr = Bgr(0, 0, 0);
    pub const WHITE: Bgr = Bgr(255, 255, 255);
    pub const GREEN: Bgr = Bgr(0, 255, 0);
    pub const RED: Bgr = Bgr(0, 0, 255);
}

/// Row-major BGR24 pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            bail!(
                "frame data size mismatch: {} bytes for {}x{} (expected {})",
                data.len(),
                width,
                height,
                expected
            );
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width as usize * height as usize * 3],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Bgr> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        Some(Bgr(self.data[idx], self.data[idx + 1], self.data[idx + 2]))
    }

    /// Writes one pixel; coordinates outside the frame are ignored.
    #[inline]
    pub fn put_pixel(&mut self, x: i64, y: i64, color: Bgr) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        self.data[idx] = color.0;
        self.data[idx + 1] = color.1;
        self.data[idx + 2] = color.2;
    }

    /// Fills the inclusive rectangle `(x0, y0)–(x1, y1)`, clipped to the frame.
    pub fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Bgr) {
        let (left, right) = (x0.min(x1).max(0), x0.max(x1).min(self.width as i64 - 1));
        let (top, bottom) = (y0.min(y1).max(0), y0.max(y1).min(self.height as i64 - 1));
        for y in top..=bottom {
            for x in left..=right {
                self.put_pixel(x, y, color);
            }
        }
    }

    pub fn fill_circle(&mut self, cx: i64, cy: i64, radius: i64, color: Bgr) {
        let radius = radius.max(0);
        if cx.saturating_add(radius) < 0
            || cy.saturating_add(radius) < 0
            || cx.saturating_sub(radius) >= self.width as i64
            || cy.saturating_sub(radius) >= self.height as i64
        {
            return;
        }
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.put_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Straight line stamped with a square brush of side `thickness`. Only the part of the
    /// segment that can touch the frame is walked.
    pub fn draw_line(&mut self, from: (i64, i64), to: (i64, i64), thickness: i64, color: Bgr) {
        let thickness = thickness.max(1);
        let half = thickness / 2;
        let margin = thickness as f64;
        let Some((from, to)) = clip_segment(
            (from.0 as f64, from.1 as f64),
            (to.0 as f64, to.1 as f64),
            (-margin, -margin),
            (self.width as f64 + margin, self.height as f64 + margin),
        ) else {
            return;
        };

        let (x0, y0) = (from.0.round() as i64, from.1.round() as i64);
        let (x1, y1) = (to.0.round() as i64, to.1.round() as i64);
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).max(1);
        for i in 0..=steps {
            let x = x0 + (x1 - x0) * i / steps;
            let y = y0 + (y1 - y0) * i / steps;
            self.fill_rect(
                x - half,
                y - half,
                x - half + thickness - 1,
                y - half + thickness - 1,
                color,
            );
        }
    }
}

type Segment = ((f64, f64), (f64, f64));

/// Liang-Barsky clip of a segment against the box `min..=max`. `None` when the segment
/// misses the box or has a non-finite endpoint.
fn clip_segment(
    from: (f64, f64),
    to: (f64, f64),
    min: (f64, f64),
    max: (f64, f64),
) -> Option<Segment> {
    if ![from.0, from.1, to.0, to.1].iter().all(|v| v.is_finite()) {
        return None;
    }
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    if !dx.is_finite() || !dy.is_finite() {
        return None;
    }

    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    for (p, q) in [
        (-dx, from.0 - min.0),
        (dx, max.0 - from.0),
        (-dy, from.1 - min.1),
        (dy, max.1 - from.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }

    Some((
        (from.0 + t0 * dx, from.1 + t0 * dy),
        (from.0 + t1 * dx, from.1 + t1 * dy),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_buffer_size() {
        assert!(Frame::new(4, 2, vec![0; 23]).is_err());
        assert!(Frame::new(4, 2, vec![0; 24]).is_ok());
    }

    #[test]
    fn fill_rect_is_clipped() {
        let mut frame = Frame::blank(10, 10);
        frame.fill_rect(-5, -5, 3, 3, Bgr::WHITE);
        assert_eq!(frame.pixel(0, 0), Some(Bgr::WHITE));
        assert_eq!(frame.pixel(3, 3), Some(Bgr::WHITE));
        assert_eq!(frame.pixel(4, 4), Some(Bgr::BLACK));
        frame.fill_rect(8, 8, 50, 50, Bgr::RED);
        assert_eq!(frame.pixel(9, 9), Some(Bgr::RED));
    }

    #[test]
    fn line_covers_endpoints() {
        let mut frame = Frame::blank(20, 20);
        frame.draw_line((2, 3), (15, 12), 1, Bgr::GREEN);
        assert_eq!(frame.pixel(2, 3), Some(Bgr::GREEN));
        assert_eq!(frame.pixel(15, 12), Some(Bgr::GREEN));
    }

    #[test]
    fn far_off_frame_line_is_clipped() {
        let mut frame = Frame::blank(64, 48);
        frame.draw_line((32, 24), (i64::MAX, 24), 2, Bgr::GREEN);
        assert_eq!(frame.pixel(32, 24), Some(Bgr::GREEN));
        assert_eq!(frame.pixel(63, 24), Some(Bgr::GREEN));

        frame.draw_line((i64::MIN, i64::MIN), (i64::MAX, i64::MIN), 2, Bgr::RED);
        frame.draw_line((-500, -500), (-10, 900), 2, Bgr::RED);
        assert!(!frame.data().chunks(3).any(|px| px == [0, 0, 255]));
    }

    #[test]
    fn circle_far_outside_is_skipped() {
        let mut frame = Frame::blank(8, 8);
        frame.fill_circle(i64::MAX, i64::MIN, 4, Bgr::WHITE);
        frame.fill_circle(9, 4, 2, Bgr::WHITE);
        assert_eq!(frame.pixel(7, 4), Some(Bgr::WHITE));
        assert_eq!(frame.pixel(0, 0), Some(Bgr::BLACK));
    }
}
