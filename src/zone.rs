//! Glyph zones.

use super::{
    error::HintErrorKind,
    graphics::{CoordAxis, GraphicsState},
    math,
    point::{PointFlags, PointMarker},
};
use font_types::{F26Dot6, Point};

use HintErrorKind::{InvalidPointIndex, InvalidPointRange};

/// Selects which zone a zone pointer role refers to.
///
/// Instructions address points through the three zone pointer roles, each
/// of which names either the twilight zone (virtual points with no
/// permanent outline position) or the glyph outline itself.
#[derive(Copy, Clone, PartialEq, Default, Debug)]
#[repr(u8)]
pub enum ZonePointer {
    Twilight = 0,
    #[default]
    Glyph = 1,
}

impl ZonePointer {
    pub fn is_twilight(self) -> bool {
        self == Self::Twilight
    }
}

impl TryFrom<i32> for ZonePointer {
    type Error = HintErrorKind;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Twilight),
            1 => Ok(Self::Glyph),
            _ => Err(HintErrorKind::InvalidZoneIndex(value)),
        }
    }
}

/// One set of hintable points over borrowed buffers.
///
/// Four parallel arrays describe the points: design space coordinates,
/// the scaled-but-unhinted copy, the working coordinates that instructions
/// move, and per point flags. `contours` holds the last point index of
/// each contour.
#[derive(Default, Debug)]
pub struct Zone<'a> {
    /// Coordinates in font units, before scaling.
    pub unscaled: &'a [Point<i32>],
    /// Scaled coordinates as they were before this program ran.
    pub original: &'a mut [Point<F26Dot6>],
    /// Working coordinates, mutated by instructions.
    pub points: &'a mut [Point<F26Dot6>],
    pub flags: &'a mut [PointFlags],
    pub contours: &'a [u16],
}

impl<'a> Zone<'a> {
    pub fn new(
        unscaled: &'a [Point<i32>],
        original: &'a mut [Point<F26Dot6>],
        points: &'a mut [Point<F26Dot6>],
        flags: &'a mut [PointFlags],
        contours: &'a [u16],
    ) -> Self {
        Self {
            unscaled,
            original,
            points,
            flags,
            contours,
        }
    }

    pub fn point(&self, index: usize) -> Result<Point<F26Dot6>, HintErrorKind> {
        match self.points.get(index) {
            Some(point) => Ok(*point),
            None => Err(InvalidPointIndex(index)),
        }
    }

    pub fn point_mut(&mut self, index: usize) -> Result<&mut Point<F26Dot6>, HintErrorKind> {
        self.points.get_mut(index).ok_or(InvalidPointIndex(index))
    }

    pub fn original(&self, index: usize) -> Result<Point<F26Dot6>, HintErrorKind> {
        match self.original.get(index) {
            Some(point) => Ok(*point),
            None => Err(InvalidPointIndex(index)),
        }
    }

    pub fn original_mut(&mut self, index: usize) -> Result<&mut Point<F26Dot6>, HintErrorKind> {
        self.original.get_mut(index).ok_or(InvalidPointIndex(index))
    }

    /// Returns the font unit coordinates for a point.
    ///
    /// The twilight zone carries no design space data and is backed by an
    /// empty slice here, so every twilight point reads as the origin.
    pub fn unscaled(&self, index: usize) -> Point<i32> {
        self.unscaled.get(index).copied().unwrap_or_default()
    }

    pub fn contour(&self, index: usize) -> Result<u16, HintErrorKind> {
        match self.contours.get(index) {
            Some(end) => Ok(*end),
            None => Err(HintErrorKind::InvalidContourIndex(index)),
        }
    }

    fn flags_mut(&mut self, index: usize) -> Result<&mut PointFlags, HintErrorKind> {
        self.flags.get_mut(index).ok_or(InvalidPointIndex(index))
    }

    pub fn touch(&mut self, index: usize, axis: CoordAxis) -> Result<(), HintErrorKind> {
        self.flags_mut(index)?.set_marker(axis.touched_marker());
        Ok(())
    }

    pub fn untouch(&mut self, index: usize, axis: CoordAxis) -> Result<(), HintErrorKind> {
        self.flags_mut(index)?.clear_marker(axis.touched_marker());
        Ok(())
    }

    pub fn is_touched(&self, index: usize, axis: CoordAxis) -> Result<bool, HintErrorKind> {
        let flags = self.flags.get(index).ok_or(InvalidPointIndex(index))?;
        Ok(flags.has_marker(axis.touched_marker()))
    }

    pub fn flip_on_curve(&mut self, index: usize) -> Result<(), HintErrorKind> {
        self.flags_mut(index)?.flip_on_curve();
        Ok(())
    }

    pub fn set_on_curve(&mut self, start: usize, end: usize, on: bool) -> Result<(), HintErrorKind> {
        let flags = self
            .flags
            .get_mut(start..end)
            .ok_or(InvalidPointRange(start, end))?;
        for flags in flags {
            if on {
                flags.set_on_curve();
            } else {
                flags.clear_on_curve();
            }
        }
        Ok(())
    }

    /// Interpolates untouched points, one axis at a time.
    ///
    /// Within each contour, every run of untouched points bracketed by two
    /// touched points is blended between them; a contour with exactly one
    /// touched point is shifted rigidly by that point's displacement
    /// instead, and a contour with none is left alone.
    pub fn iup(&mut self, axis: CoordAxis) -> Result<(), HintErrorKind> {
        let mut start = 0usize;
        for contour_ix in 0..self.contours.len() {
            let end = (self.contour(contour_ix)? as usize)
                .min(self.points.len().saturating_sub(1));
            let mut cursor = start;
            while cursor <= end && !self.is_touched(cursor, axis)? {
                cursor += 1;
            }
            if cursor <= end {
                let first_touched = cursor;
                let mut prev_touched = cursor;
                cursor += 1;
                while cursor <= end {
                    if self.is_touched(cursor, axis)? {
                        self.iup_interpolate(
                            axis,
                            prev_touched + 1,
                            cursor - 1,
                            prev_touched,
                            cursor,
                        )?;
                        prev_touched = cursor;
                    }
                    cursor += 1;
                }
                if prev_touched == first_touched {
                    self.iup_shift(axis, start, end, prev_touched)?;
                } else {
                    // the run between the last and first touched points
                    // wraps around the contour seam
                    self.iup_interpolate(axis, prev_touched + 1, end, prev_touched, first_touched)?;
                    if first_touched > 0 {
                        self.iup_interpolate(
                            axis,
                            start,
                            first_touched - 1,
                            prev_touched,
                            first_touched,
                        )?;
                    }
                }
            }
            start = end + 1;
        }
        Ok(())
    }

    /// Moves every point of `start..=end` except `touched` by the same
    /// displacement that was applied to `touched`.
    fn iup_shift(
        &mut self,
        axis: CoordAxis,
        start: usize,
        end: usize,
        touched: usize,
    ) -> Result<(), HintErrorKind> {
        if start > touched || touched > end {
            return Ok(());
        }
        let reference = self.point(touched)?;
        let reference_orig = self.original(touched)?;
        let delta = match axis {
            CoordAxis::X => reference.x - reference_orig.x,
            _ => reference.y - reference_orig.y,
        };
        if delta == F26Dot6::ZERO {
            return Ok(());
        }
        let points = self
            .points
            .get_mut(start..=end)
            .ok_or(InvalidPointRange(start, end + 1))?;
        for (ix, point) in points.iter_mut().enumerate() {
            if ix + start == touched {
                continue;
            }
            match axis {
                CoordAxis::X => point.x += delta,
                _ => point.y += delta,
            }
        }
        Ok(())
    }

    /// Blends the points of `start..=end` between the two touched
    /// reference points.
    ///
    /// Points whose original coordinate falls between the references move
    /// proportionally in design space; points outside that span inherit
    /// the nearer reference's displacement unchanged.
    fn iup_interpolate(
        &mut self,
        axis: CoordAxis,
        start: usize,
        end: usize,
        mut ref1: usize,
        mut ref2: usize,
    ) -> Result<(), HintErrorKind> {
        if start > end {
            return Ok(());
        }
        if ref1 >= self.points.len() || ref2 >= self.points.len() {
            return Ok(());
        }
        // order the references by design space coordinate
        let coord_i32 = |p: Point<i32>| match axis {
            CoordAxis::X => p.x,
            _ => p.y,
        };
        let coord = |p: Point<F26Dot6>| match axis {
            CoordAxis::X => p.x,
            _ => p.y,
        };
        let mut orus1 = coord_i32(self.unscaled(ref1));
        let mut orus2 = coord_i32(self.unscaled(ref2));
        if orus1 > orus2 {
            core::mem::swap(&mut orus1, &mut orus2);
            core::mem::swap(&mut ref1, &mut ref2);
        }
        let org1 = coord(self.original(ref1)?);
        let org2 = coord(self.original(ref2)?);
        let cur1 = coord(self.point(ref1)?);
        let cur2 = coord(self.point(ref2)?);
        let delta1 = cur1 - org1;
        let delta2 = cur2 - org2;
        // degenerate references collapse the interior to cur1
        let scale = (cur1 != cur2 && orus1 != orus2)
            .then(|| math::div((cur2 - cur1).to_bits(), orus2 - orus1));
        let blend = |org: F26Dot6, orus: i32| {
            if org <= org1 {
                org + delta1
            } else if org >= org2 {
                org + delta2
            } else if let Some(scale) = scale {
                cur1 + F26Dot6::from_bits(math::mul(orus - orus1, scale))
            } else {
                cur1
            }
        };
        let originals = self
            .original
            .get(start..=end)
            .ok_or(InvalidPointRange(start, end + 1))?;
        let unscaled = self
            .unscaled
            .get(start..=end)
            .ok_or(InvalidPointRange(start, end + 1))?;
        let points = self
            .points
            .get_mut(start..=end)
            .ok_or(InvalidPointRange(start, end + 1))?;
        match axis {
            CoordAxis::X => {
                for ((point, orig), unsc) in points.iter_mut().zip(originals).zip(unscaled) {
                    point.x = blend(orig.x, unsc.x);
                }
            }
            _ => {
                for ((point, orig), unsc) in points.iter_mut().zip(originals).zip(unscaled) {
                    point.y = blend(orig.y, unsc.y);
                }
            }
        }
        Ok(())
    }
}

impl<'a> GraphicsState<'a> {
    /// Returns true if every (zone, point) pair is addressable.
    ///
    /// Handlers call this up front so lenient mode can skip an operation
    /// wholesale instead of failing halfway through.
    pub fn in_bounds<const N: usize>(&self, pairs: [(ZonePointer, usize); N]) -> bool {
        pairs
            .iter()
            .all(|(zp, index)| *index < self.zone(*zp).points.len())
    }

    #[inline(always)]
    pub fn zone(&self, pointer: ZonePointer) -> &Zone<'a> {
        &self.zones[pointer as usize]
    }

    #[inline(always)]
    pub fn zone_mut(&mut self, pointer: ZonePointer) -> &mut Zone<'a> {
        &mut self.zones[pointer as usize]
    }

    #[inline(always)]
    pub fn zp0(&self) -> &Zone<'a> {
        self.zone(self.zp0)
    }

    #[inline(always)]
    pub fn zp0_mut(&mut self) -> &mut Zone<'a> {
        self.zone_mut(self.zp0)
    }

    #[inline(always)]
    pub fn zp1(&self) -> &Zone<'a> {
        self.zone(self.zp1)
    }

    #[inline(always)]
    pub fn zp1_mut(&mut self) -> &mut Zone<'a> {
        self.zone_mut(self.zp1)
    }

    #[inline(always)]
    pub fn zp2(&self) -> &Zone<'a> {
        self.zone(self.zp2)
    }

    #[inline(always)]
    pub fn zp2_mut(&mut self) -> &mut Zone<'a> {
        self.zone_mut(self.zp2)
    }
}

impl GraphicsState<'_> {
    /// Displaces the unhinted copy of a point by `distance` along the
    /// freedom vector.
    pub(crate) fn move_original(
        &mut self,
        zone: ZonePointer,
        point_ix: usize,
        distance: F26Dot6,
    ) -> Result<(), HintErrorKind> {
        let fv = self.freedom_vector;
        let fdotp = self.fdotp;
        let axis = self.freedom_axis;
        let point = self.zone_mut(zone).original_mut(point_ix)?;
        match axis {
            CoordAxis::X => point.x += distance,
            CoordAxis::Y => point.y += distance,
            CoordAxis::Both => {
                let bits = distance.to_bits();
                if fv.x != 0 {
                    point.x += F26Dot6::from_bits(math::mul_div(bits, fv.x, fdotp));
                }
                if fv.y != 0 {
                    point.y += F26Dot6::from_bits(math::mul_div(bits, fv.y, fdotp));
                }
            }
        }
        Ok(())
    }

    /// Displaces a working point by `distance` along the freedom vector,
    /// marking the affected axes touched.
    pub(crate) fn move_point(
        &mut self,
        zone: ZonePointer,
        point_ix: usize,
        distance: F26Dot6,
    ) -> Result<(), HintErrorKind> {
        let fv = self.freedom_vector;
        let fdotp = self.fdotp;
        let axis = self.freedom_axis;
        let zone = self.zone_mut(zone);
        match axis {
            CoordAxis::X => {
                zone.point_mut(point_ix)?.x += distance;
                zone.touch(point_ix, CoordAxis::X)?;
            }
            CoordAxis::Y => {
                zone.point_mut(point_ix)?.y += distance;
                zone.touch(point_ix, CoordAxis::Y)?;
            }
            CoordAxis::Both => {
                let bits = distance.to_bits();
                if fv.x != 0 {
                    zone.point_mut(point_ix)?.x +=
                        F26Dot6::from_bits(math::mul_div(bits, fv.x, fdotp));
                    zone.touch(point_ix, CoordAxis::X)?;
                }
                if fv.y != 0 {
                    zone.point_mut(point_ix)?.y +=
                        F26Dot6::from_bits(math::mul_div(bits, fv.y, fdotp));
                    zone.touch(point_ix, CoordAxis::Y)?;
                }
            }
        }
        Ok(())
    }

    /// Applies a precomputed delta to a point in the zp2 zone, touching
    /// only the axes the freedom vector has a component on.
    ///
    /// Shared by the SHP, SHC, SHZ and SHPIX handlers.
    pub(crate) fn move_zp2_point(
        &mut self,
        point_ix: usize,
        dx: F26Dot6,
        dy: F26Dot6,
        do_touch: bool,
    ) -> Result<(), HintErrorKind> {
        let fv = self.freedom_vector;
        let zone = self.zp2_mut();
        if fv.x != 0 {
            zone.point_mut(point_ix)?.x += dx;
            if do_touch {
                zone.touch(point_ix, CoordAxis::X)?;
            }
        }
        if fv.y != 0 {
            zone.point_mut(point_ix)?.y += dy;
            if do_touch {
                zone.touch(point_ix, CoordAxis::Y)?;
            }
        }
        Ok(())
    }

    /// Measures how far a reference point has moved from its unhinted
    /// position, resolved into per axis deltas along the freedom vector.
    ///
    /// The low opcode bit selects the (zone, reference point) pair, per
    /// the SHP and SHC encodings.
    pub(crate) fn point_displacement(
        &mut self,
        opcode: u8,
    ) -> Result<PointDisplacement, HintErrorKind> {
        let (zone, point_ix) = if (opcode & 1) != 0 {
            (self.zp0, self.rp1)
        } else {
            (self.zp1, self.rp2)
        };
        let selected = self.zone(zone);
        let distance = self
            .project(selected.point(point_ix)?, selected.original(point_ix)?)
            .to_bits();
        let fv = self.freedom_vector;
        Ok(PointDisplacement {
            zone,
            point_ix,
            dx: F26Dot6::from_bits(math::mul_div(distance, fv.x, self.fdotp)),
            dy: F26Dot6::from_bits(math::mul_div(distance, fv.y, self.fdotp)),
        })
    }
}

#[derive(PartialEq, Debug)]
pub(crate) struct PointDisplacement {
    pub zone: ZonePointer,
    pub point_ix: usize,
    pub dx: F26Dot6,
    pub dy: F26Dot6,
}

impl CoordAxis {
    fn touched_marker(self) -> PointMarker {
        match self {
            CoordAxis::Both => PointMarker::TOUCHED,
            CoordAxis::X => PointMarker::TOUCHED_X,
            CoordAxis::Y => PointMarker::TOUCHED_Y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{math, CoordAxis, GraphicsState, PointDisplacement, Zone, ZonePointer};
    use crate::point::{PointFlags, PointMarker};
    use font_types::{F26Dot6, Point};

    #[test]
    fn flip_and_set_on_curve() {
        let on = PointFlags::on_curve();
        let off = PointFlags::off_curve_quad();
        let mut flags = [off, on, off, on];
        let mut zone = Zone {
            flags: &mut flags,
            ..Default::default()
        };
        zone.flip_on_curve(0).unwrap();
        zone.flip_on_curve(3).unwrap();
        assert_eq!(zone.flags, &[on, on, off, off]);
        zone.set_on_curve(1, 3, false).unwrap();
        assert_eq!(zone.flags, &[on, off, off, off]);
        zone.set_on_curve(0, 4, true).unwrap();
        assert_eq!(zone.flags, &[on, on, on, on]);
        assert!(zone.set_on_curve(2, 5, true).is_err());
    }

    #[test]
    fn iup_lone_touched_point_shifts_contour() {
        let [untouched, touched] = markers();
        let mut original = scaled([(0, 0), (32, 16), (64, 32)]);
        // the middle point was moved by (8, -6)
        let mut points = scaled([(0, 0), (40, 10), (64, 32)]);
        let mut flags = [untouched, touched, untouched];
        let mut zone = Zone {
            original: &mut original,
            points: &mut points,
            flags: &mut flags,
            contours: &[2],
            ..Default::default()
        };
        zone.iup(CoordAxis::X).unwrap();
        assert_eq!(zone.points, &scaled([(8, 0), (40, 10), (72, 32)]));
        zone.iup(CoordAxis::Y).unwrap();
        assert_eq!(zone.points, &scaled([(8, -6), (40, 10), (72, 26)]));
    }

    #[test]
    fn iup_blends_between_touched_points() {
        let [untouched, touched] = markers();
        let unscaled = [Point::new(0, 0), Point::new(250, 250), Point::new(1000, 1000)];
        let mut original = scaled([(0, 0), (16, 16), (64, 64)]);
        let mut points = scaled([(10, 6), (16, 16), (80, 100)]);
        let mut flags = [touched, untouched, touched];
        let mut zone = Zone {
            unscaled: &unscaled,
            original: &mut original,
            points: &mut points,
            flags: &mut flags,
            // a contour end past the last point clamps
            contours: &[5],
        };
        zone.iup(CoordAxis::X).unwrap();
        assert_eq!(zone.points, &scaled([(10, 6), (28, 16), (80, 100)]));
        zone.iup(CoordAxis::Y).unwrap();
        assert_eq!(zone.points, &scaled([(10, 6), (28, 29), (80, 100)]));
    }

    #[test]
    fn in_bounds_rejects_point_count() {
        let mut mock = MockZones::new();
        let gs = mock.graphics_state(5, 0);
        assert!(gs.in_bounds([(ZonePointer::Glyph, 2)]));
        assert!(!gs.in_bounds([(ZonePointer::Glyph, 3)]));
        assert!(!gs.in_bounds([(ZonePointer::Twilight, 0)]));
    }

    #[test]
    fn move_point_along_x() {
        let mut mock = MockZones::new();
        let mut gs = mock.graphics_state(5, 0);
        gs.move_point(ZonePointer::Glyph, 1, F26Dot6::from_bits(25))
            .unwrap();
        let point = gs.zones[1].point(1).unwrap();
        assert_eq!(point.map(F26Dot6::to_bits), Point::new(125, 80));
        assert!(gs.zones[1].is_touched(1, CoordAxis::X).unwrap());
        assert!(!gs.zones[1].is_touched(1, CoordAxis::Y).unwrap());
    }

    #[test]
    fn move_point_along_diagonal() {
        let mut mock = MockZones::new();
        let mut gs = mock.graphics_state(1, 1);
        gs.move_point(ZonePointer::Glyph, 0, F26Dot6::from_bits(64))
            .unwrap();
        // one pixel along the 45 degree vector adds ~0.707 to each axis
        let point = gs.zones[1].point(0).unwrap();
        assert_eq!(point.map(F26Dot6::to_bits), Point::new(55, 25));
        assert!(gs.zones[1].is_touched(0, CoordAxis::Both).unwrap());
    }

    #[test]
    fn move_original_along_axes() {
        let mut mock = MockZones::new();
        let mut gs = mock.graphics_state(5, 0);
        gs.move_original(ZonePointer::Glyph, 0, F26Dot6::from_bits(25))
            .unwrap();
        assert_eq!(
            gs.zones[1].original(0).unwrap().map(F26Dot6::to_bits),
            Point::new(25, 0)
        );
        let mut gs = mock.graphics_state(1, 1);
        gs.move_original(ZonePointer::Glyph, 0, F26Dot6::from_bits(64))
            .unwrap();
        assert_eq!(
            gs.zones[1].original(0).unwrap().map(F26Dot6::to_bits),
            Point::new(70, 45)
        );
    }

    #[test]
    fn move_zp2_point_applies_raw_deltas() {
        let mut mock = MockZones::new();
        let mut gs = mock.graphics_state(1, 1);
        gs.zp2 = ZonePointer::Glyph;
        gs.move_zp2_point(2, F26Dot6::from_bits(10), F26Dot6::from_bits(-10), false)
            .unwrap();
        let point = gs.zones[1].point(2).unwrap();
        assert_eq!(point.map(F26Dot6::to_bits), Point::new(74, 54));
        assert!(!gs.zones[1].is_touched(2, CoordAxis::Both).unwrap());
    }

    #[test]
    fn point_displacement_selects_by_opcode_bit() {
        let mut mock = MockZones::new();
        let mut gs = mock.graphics_state(1, 1);
        gs.zp0 = ZonePointer::Glyph;
        gs.zp1 = ZonePointer::Glyph;
        // odd opcode: zp0/rp1
        gs.rp1 = 2;
        assert_eq!(
            gs.point_displacement(0x33).unwrap(),
            PointDisplacement {
                zone: ZonePointer::Glyph,
                point_ix: 2,
                dx: F26Dot6::from_bits(32),
                dy: F26Dot6::from_bits(32),
            }
        );
        // even opcode: zp1/rp2
        gs.rp2 = 0;
        assert_eq!(
            gs.point_displacement(0x32).unwrap(),
            PointDisplacement {
                zone: ZonePointer::Glyph,
                point_ix: 0,
                dx: F26Dot6::from_bits(-5),
                dy: F26Dot6::from_bits(-5),
            }
        );
    }

    struct MockZones {
        points: [Point<F26Dot6>; 3],
        original: [Point<F26Dot6>; 3],
        flags: [PointFlags; 3],
        contours: [u16; 1],
    }

    impl MockZones {
        fn new() -> Self {
            Self {
                points: scaled([(10, -20), (100, 80), (64, 64)]),
                original: scaled([(0, 0), (100, 80), (32, 32)]),
                flags: [PointFlags::default(); 3],
                contours: [2],
            }
        }

        fn graphics_state(&mut self, fv_x: i32, fv_y: i32) -> GraphicsState {
            let glyph = Zone {
                original: &mut self.original,
                points: &mut self.points,
                flags: &mut self.flags,
                contours: &self.contours,
                ..Default::default()
            };
            let vector = math::normalize14(fv_x, fv_y);
            let mut gs = GraphicsState {
                zones: [Zone::default(), glyph],
                freedom_vector: vector,
                proj_vector: vector,
                ..Default::default()
            };
            gs.update_projection_state();
            gs
        }
    }

    fn markers() -> [PointFlags; 2] {
        let untouched = PointFlags::default();
        let mut touched = untouched;
        touched.set_marker(PointMarker::TOUCHED);
        [untouched, touched]
    }

    fn scaled<const N: usize>(coords: [(i32, i32); N]) -> [Point<F26Dot6>; N] {
        coords.map(|(x, y)| Point::new(F26Dot6::from_bits(x), F26Dot6::from_bits(y)))
    }
}
