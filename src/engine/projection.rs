//! Per-column ray angle table, rebuilt when screen size or field of
//! view change (in practice: once per configuration, reused every
//! frame).
//!
//! Columns fan out across the view plane, not uniformly in angle:
//! column `x` samples the plane at `(x + 0.5 - w/2) / focal`, so the
//! offset is `atan` of that. The cosine of the same offset is kept
//! alongside — multiplying a ray's travel distance by it yields the
//! perpendicular distance the height scaling needs (fish-eye
//! correction).

pub struct ColumnAngles {
    /// Signed angle offset from the view axis, per column.
    pub offset: Vec<f32>,
    /// `cos(offset)`, per column.
    pub fisheye: Vec<f32>,
}

impl ColumnAngles {
    pub fn build(width: usize, fov: f32) -> Self {
        let focal = width as f32 * 0.5 / (fov * 0.5).tan();
        let half_w = width as f32 * 0.5;

        let mut offset = Vec::with_capacity(width);
        let mut fisheye = Vec::with_capacity(width);
        for x in 0..width {
            // sample through the column centre
            let a = ((x as f32 + 0.5 - half_w) / focal).atan();
            offset.push(a);
            fisheye.push(a.cos());
        }
        ColumnAngles { offset, fisheye }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.offset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offset.is_empty()
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn table_is_antisymmetric_about_centre() {
        let t = ColumnAngles::build(640, FRAC_PI_2);
        assert_eq!(t.len(), 640);
        for x in 0..320 {
            let mirrored = t.offset[639 - x];
            assert!((t.offset[x] + mirrored).abs() < 1e-5);
        }
    }

    #[test]
    fn edges_reach_half_fov() {
        let t = ColumnAngles::build(640, FRAC_PI_2);
        // outermost column centre sits just inside ±45°
        assert!(t.offset[0] > -FRAC_PI_2 / 2.0 - 1e-3);
        assert!(t.offset[0] < -0.78);
        assert!(t.offset[639] > 0.78);
    }

    #[test]
    fn fisheye_is_cosine_of_offset() {
        let t = ColumnAngles::build(320, 1.2);
        for x in [0, 77, 160, 319] {
            assert!((t.fisheye[x] - t.offset[x].cos()).abs() < 1e-6);
        }
    }

    #[test]
    fn centre_column_looks_straight_ahead() {
        // odd width puts one column exactly on the view axis
        let t = ColumnAngles::build(641, FRAC_PI_2);
        assert!(t.offset[320].abs() < 1e-6);
        assert!((t.fisheye[320] - 1.0).abs() < 1e-6);
    }
}
