//! Instructions that move outline points.

use super::{
    super::{
        error::HintErrorKind,
        graphics::CoordAxis,
        math,
        zone::{PointDisplacement, ZonePointer},
    },
    Engine, OpResult, F26Dot6, Point,
};

impl<'a> Engine<'a> {
    /// FLIPPT[] (0x80): toggle the on-curve flag of each popped point in
    /// the glyph zone. Repeats per the loop counter.
    ///
    /// in: p1..pn (point numbers)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#flip-point>
    pub(super) fn op_flippt(&mut self) -> OpResult {
        let count = self.graphics.loop_counter as usize;
        self.graphics.loop_counter = 1;
        let is_pedantic = self.graphics.is_pedantic;
        let zone = self.graphics.zone_mut(ZonePointer::Glyph);
        for _ in 0..count {
            let p = self.value_stack.pop_usize()?;
            if p >= zone.points.len() {
                if is_pedantic {
                    return Err(HintErrorKind::InvalidPointIndex(p));
                }
                continue;
            }
            zone.flip_on_curve(p)?;
        }
        Ok(())
    }

    /// FLIPRGON[] (0x81): mark an inclusive range of glyph zone points as
    /// on-curve.
    ///
    /// in: highpoint, lowpoint
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#flip-range-on>
    pub(super) fn op_fliprgon(&mut self) -> OpResult {
        self.set_on_curve_for_range(true)
    }

    /// FLIPRGOFF[] (0x82): mark an inclusive range of glyph zone points as
    /// off-curve.
    ///
    /// in: highpoint, lowpoint
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#flip-range-off>
    pub(super) fn op_fliprgoff(&mut self) -> OpResult {
        self.set_on_curve_for_range(false)
    }

    /// SHP[a] (0x32..=0x33): displace each popped point by the amount the
    /// selected reference point moved from its original position (bit 0
    /// set: rp1/zp0, clear: rp2/zp1). Repeats per the loop counter.
    ///
    /// in: p1..pn (points in the zp2 zone)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#shift-point-by-the-last-point>
    pub(super) fn op_shp(&mut self, opcode: u8) -> OpResult {
        let PointDisplacement { dx, dy, .. } = self.graphics.point_displacement(opcode)?;
        let count = self.graphics.loop_counter as usize;
        self.graphics.loop_counter = 1;
        let is_pedantic = self.graphics.is_pedantic;
        for _ in 0..count {
            let p = self.value_stack.pop_usize()?;
            if !self.graphics.in_bounds([(self.graphics.zp2, p)]) {
                if is_pedantic {
                    return Err(HintErrorKind::InvalidPointIndex(p));
                }
                continue;
            }
            self.graphics.move_zp2_point(p, dx, dy, true)?;
        }
        Ok(())
    }

    /// SHC[a] (0x34..=0x35): displace a whole contour by the amount the
    /// selected reference point moved, leaving the reference point itself
    /// in place.
    ///
    /// in: c (contour number in the zp2 zone)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#shift-contour-by-the-last-point>
    pub(super) fn op_shc(&mut self, opcode: u8) -> OpResult {
        let contour_ix = self.value_stack.pop_usize()?;
        let pd = self.graphics.point_displacement(opcode)?;
        let gs = &mut self.graphics;
        if !gs.zp2.is_twilight() && contour_ix >= gs.zp2().contours.len() {
            return if gs.is_pedantic {
                Err(HintErrorKind::InvalidContourIndex(contour_ix))
            } else {
                Ok(())
            };
        }
        let start = if contour_ix == 0 {
            0
        } else {
            gs.zp2().contour(contour_ix - 1)? as usize + 1
        };
        let end = if gs.zp2.is_twilight() {
            gs.zp2().points.len()
        } else {
            gs.zp2().contour(contour_ix)? as usize + 1
        };
        for p in start..end {
            if pd.zone != gs.zp2 || pd.point_ix != p {
                gs.move_zp2_point(p, pd.dx, pd.dy, true)?;
            }
        }
        Ok(())
    }

    /// SHZ[a] (0x36..=0x37): displace every point in the zp2 zone by the
    /// amount the selected reference point moved, without touching them
    /// and skipping the reference point itself.
    ///
    /// in: e (zone number)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#shift-zone-by-the-last-pt>
    pub(super) fn op_shz(&mut self, opcode: u8) -> OpResult {
        let _e = ZonePointer::try_from(self.value_stack.pop()?)?;
        let pd = self.graphics.point_displacement(opcode)?;
        let gs = &mut self.graphics;
        let end = if gs.zp2.is_twilight() {
            gs.zp2().points.len()
        } else {
            gs.zp2()
                .contours
                .last()
                .map(|c| *c as usize + 1)
                .unwrap_or_default()
        };
        for p in 0..end {
            if pd.zone != gs.zp2 || pd.point_ix != p {
                gs.move_zp2_point(p, pd.dx, pd.dy, false)?;
            }
        }
        Ok(())
    }

    /// SHPIX[] (0x38): move each popped point by a 26.6 amount along the
    /// freedom vector. Repeats per the loop counter.
    ///
    /// in: amount (26.6), then p1..pn (points in the zp2 zone)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#shift-point-by-a-pixel-amount>
    pub(super) fn op_shpix(&mut self) -> OpResult {
        let amount = self.value_stack.pop()?;
        let fv = self.graphics.freedom_vector;
        let dx = F26Dot6::from_bits(math::mul14(amount, fv.x));
        let dy = F26Dot6::from_bits(math::mul14(amount, fv.y));
        let count = self.graphics.loop_counter as usize;
        self.graphics.loop_counter = 1;
        let is_pedantic = self.graphics.is_pedantic;
        for _ in 0..count {
            let p = self.value_stack.pop_usize()?;
            if !self.graphics.in_bounds([(self.graphics.zp2, p)]) {
                if is_pedantic {
                    return Err(HintErrorKind::InvalidPointIndex(p));
                }
                continue;
            }
            self.graphics.move_zp2_point(p, dx, dy, true)?;
        }
        Ok(())
    }

    /// MSIRP[a] (0x3A..=0x3B): move point p until its projected distance
    /// from rp0 equals the popped 26.6 value. Bit 0 additionally makes p
    /// the new rp0.
    ///
    /// in: d (26.6), p (point number)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#move-stack-indirect-relative-point>
    pub(super) fn op_msirp(&mut self, opcode: u8) -> OpResult {
        let d = self.value_stack.pop_f26dot6()?;
        let p = self.value_stack.pop_usize()?;
        let gs = &mut self.graphics;
        if !gs.in_bounds([(gs.zp1, p), (gs.zp0, gs.rp0)]) {
            return if gs.is_pedantic {
                Err(HintErrorKind::InvalidPointIndex(p))
            } else {
                Ok(())
            };
        }
        if gs.zp1.is_twilight() {
            let original = gs.zp0().original(gs.rp0)?;
            *gs.zp1_mut().original_mut(p)? = original;
            gs.move_original(gs.zp1, p, d)?;
            let point = gs.zp1().original(p)?;
            *gs.zp1_mut().point_mut(p)? = point;
        }
        let distance = gs.project(gs.zp1().point(p)?, gs.zp0().point(gs.rp0)?);
        gs.move_point(gs.zp1, p, d.wrapping_sub(distance))?;
        gs.rp1 = gs.rp0;
        gs.rp2 = p;
        if (opcode & 1) != 0 {
            gs.rp0 = p;
        }
        Ok(())
    }

    /// MDAP[a] (0x2E..=0x2F): touch point p and, when bit 0 is set, snap
    /// its projected coordinate to the round state. p becomes rp0 and rp1.
    ///
    /// in: p (point number in the zp0 zone)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#move-direct-absolute-point>
    pub(super) fn op_mdap(&mut self, opcode: u8) -> OpResult {
        let p = self.value_stack.pop_usize()?;
        let gs = &mut self.graphics;
        if !gs.in_bounds([(gs.zp0, p)]) {
            gs.rp0 = p;
            gs.rp1 = p;
            return if gs.is_pedantic {
                Err(HintErrorKind::InvalidPointIndex(p))
            } else {
                Ok(())
            };
        }
        let distance = if (opcode & 1) != 0 {
            let current = gs.project(gs.zp0().point(p)?, Default::default());
            gs.round(current).wrapping_sub(current)
        } else {
            F26Dot6::ZERO
        };
        gs.move_point(gs.zp0, p, distance)?;
        gs.rp0 = p;
        gs.rp1 = p;
        Ok(())
    }

    /// MIAP[a] (0x3E..=0x3F): move point p to the projected coordinate
    /// stored in CVT entry n. With bit 0 set the value is subject to the
    /// control value cut-in and rounding. p becomes rp0 and rp1.
    ///
    /// in: n (CVT index), p (point number in the zp0 zone)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#move-indirect-absolute-point>
    pub(super) fn op_miap(&mut self, opcode: u8) -> OpResult {
        let cvt_entry = self.value_stack.pop_usize()?;
        let p = self.value_stack.pop_usize()?;
        let maybe_distance = self.cvt.get(cvt_entry);
        let mut distance = if self.graphics.is_pedantic {
            maybe_distance?
        } else {
            maybe_distance.unwrap_or_default()
        };
        let gs = &mut self.graphics;
        if !gs.in_bounds([(gs.zp0, p)]) {
            gs.rp0 = p;
            gs.rp1 = p;
            return if gs.is_pedantic {
                Err(HintErrorKind::InvalidPointIndex(p))
            } else {
                Ok(())
            };
        }
        if gs.zp0.is_twilight() {
            // Original position of a twilight point is derived from the
            // CVT distance along the freedom vector.
            let fv = gs.freedom_vector;
            let original = Point::new(
                F26Dot6::from_bits(math::mul14(distance.to_bits(), fv.x)),
                F26Dot6::from_bits(math::mul14(distance.to_bits(), fv.y)),
            );
            *gs.zp0_mut().original_mut(p)? = original;
            *gs.zp0_mut().point_mut(p)? = original;
        }
        let original_distance = gs.project(gs.zp0().point(p)?, Default::default());
        if (opcode & 1) != 0 {
            let delta = distance.wrapping_sub(original_distance).to_bits().abs();
            if delta > gs.control_value_cutin.to_bits() {
                distance = original_distance;
            }
            distance = gs.round(distance);
        }
        gs.move_point(gs.zp0, p, distance.wrapping_sub(original_distance))?;
        gs.rp0 = p;
        gs.rp1 = p;
        Ok(())
    }

    /// MDRP[abcde] (0xC0..=0xDF): move point p so its projected distance
    /// from rp0 matches the distance in the original outline. Flag bits:
    /// 16 makes p the new rp0, 8 enforces the minimum distance, 4 rounds
    /// the distance; the low two bits select an engine compensation class
    /// (always zero here).
    ///
    /// in: p (point number in the zp1 zone)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#move-direct-relative-point>
    pub(super) fn op_mdrp(&mut self, opcode: u8) -> OpResult {
        let p = self.value_stack.pop_usize()?;
        let gs = &mut self.graphics;
        if !gs.in_bounds([(gs.zp1, p), (gs.zp0, gs.rp0)]) {
            gs.rp1 = gs.rp0;
            gs.rp2 = p;
            if (opcode & 16) != 0 {
                gs.rp0 = p;
            }
            return if gs.is_pedantic {
                Err(HintErrorKind::InvalidPointIndex(p))
            } else {
                Ok(())
            };
        }
        let mut original_distance = if gs.zp0.is_twilight() || gs.zp1.is_twilight() {
            gs.dual_project(gs.zp1().original(p)?, gs.zp0().original(gs.rp0)?)
        } else {
            let dist = gs.dual_project_unscaled(gs.zp1().unscaled(p), gs.zp0().unscaled(gs.rp0));
            F26Dot6::from_bits(math::mul(dist, gs.unscaled_to_pixels()))
        };
        // Single width cut in
        let cutin = gs.single_width_cutin;
        let value = gs.single_width;
        if cutin > F26Dot6::ZERO
            && original_distance > value.wrapping_sub(cutin)
            && original_distance < value.wrapping_add(cutin)
        {
            original_distance = if original_distance >= F26Dot6::ZERO {
                value
            } else {
                -value
            };
        }
        let mut distance = if (opcode & 4) != 0 {
            gs.round(original_distance)
        } else {
            original_distance
        };
        // Minimum distance
        if (opcode & 8) != 0 {
            let min_distance = gs.min_distance;
            if original_distance >= F26Dot6::ZERO {
                if distance < min_distance {
                    distance = min_distance;
                }
            } else if distance > -min_distance {
                distance = -min_distance;
            }
        }
        let current_distance = gs.project(gs.zp1().point(p)?, gs.zp0().point(gs.rp0)?);
        gs.move_point(gs.zp1, p, distance.wrapping_sub(current_distance))?;
        gs.rp1 = gs.rp0;
        gs.rp2 = p;
        if (opcode & 16) != 0 {
            gs.rp0 = p;
        }
        Ok(())
    }

    /// MIRP[abcde] (0xE0..=0xFF): move point p so its projected distance
    /// from rp0 matches a CVT distance, subject to single width
    /// substitution, auto flip, the control value cut-in (bit 4 of the
    /// flags, only within one zone), the minimum distance (bit 8) and
    /// rounding (bit 4). Bit 16 makes p the new rp0.
    ///
    /// in: n (CVT index), p (point number in the zp1 zone)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#move-indirect-relative-point>
    pub(super) fn op_mirp(&mut self, opcode: u8) -> OpResult {
        // The CVT index is biased by one so that an entry of zero selects
        // no CVT distance at all.
        let cvt_entry = (self.value_stack.pop()?.wrapping_add(1)) as usize;
        let p = self.value_stack.pop_usize()?;
        let mut cvt_distance = if cvt_entry == 0 {
            F26Dot6::ZERO
        } else {
            let maybe_distance = self.cvt.get(cvt_entry - 1);
            if self.graphics.is_pedantic {
                maybe_distance?
            } else {
                maybe_distance.unwrap_or_default()
            }
        };
        let gs = &mut self.graphics;
        // Single width cut in
        let delta = cvt_distance.wrapping_sub(gs.single_width).to_bits().abs();
        if delta < gs.single_width_cutin.to_bits() {
            cvt_distance = if cvt_distance >= F26Dot6::ZERO {
                gs.single_width
            } else {
                -gs.single_width
            };
        }
        if !gs.in_bounds([(gs.zp1, p), (gs.zp0, gs.rp0)]) {
            gs.rp1 = gs.rp0;
            gs.rp2 = p;
            if (opcode & 16) != 0 {
                gs.rp0 = p;
            }
            return if gs.is_pedantic {
                Err(HintErrorKind::InvalidPointIndex(p))
            } else {
                Ok(())
            };
        }
        if gs.zp1.is_twilight() {
            let fv = gs.freedom_vector;
            let base = gs.zp0().original(gs.rp0)?;
            let original = Point::new(
                base.x + F26Dot6::from_bits(math::mul14(cvt_distance.to_bits(), fv.x)),
                base.y + F26Dot6::from_bits(math::mul14(cvt_distance.to_bits(), fv.y)),
            );
            *gs.zp1_mut().original_mut(p)? = original;
            *gs.zp1_mut().point_mut(p)? = original;
        }
        let original_distance =
            gs.dual_project(gs.zp1().original(p)?, gs.zp0().original(gs.rp0)?);
        let current_distance = gs.project(gs.zp1().point(p)?, gs.zp0().point(gs.rp0)?);
        // Auto flip
        if gs.auto_flip && (original_distance.to_bits() ^ cvt_distance.to_bits()) < 0 {
            cvt_distance = -cvt_distance;
        }
        let mut distance = if (opcode & 4) != 0 {
            // Control value cut in is only applied when both points are in
            // the same zone.
            if gs.zp0 == gs.zp1 {
                let cv_delta = cvt_distance.wrapping_sub(original_distance).to_bits().abs();
                if cv_delta > gs.control_value_cutin.to_bits() {
                    cvt_distance = original_distance;
                }
            }
            gs.round(cvt_distance)
        } else {
            cvt_distance
        };
        // Minimum distance
        if (opcode & 8) != 0 {
            let min_distance = gs.min_distance;
            if original_distance >= F26Dot6::ZERO {
                if distance < min_distance {
                    distance = min_distance;
                }
            } else if distance > -min_distance {
                distance = -min_distance;
            }
        }
        gs.move_point(gs.zp1, p, distance.wrapping_sub(current_distance))?;
        gs.rp1 = gs.rp0;
        gs.rp2 = p;
        if (opcode & 16) != 0 {
            gs.rp0 = p;
        }
        Ok(())
    }

    /// ALIGNRP[] (0x3C): move each popped point along the freedom vector
    /// until its projected distance from rp0 is zero. Repeats per the loop
    /// counter.
    ///
    /// in: p1..pn (points in the zp1 zone)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#align-relative-point>
    pub(super) fn op_alignrp(&mut self) -> OpResult {
        let count = self.graphics.loop_counter as usize;
        self.graphics.loop_counter = 1;
        let is_pedantic = self.graphics.is_pedantic;
        if !self
            .graphics
            .in_bounds([(self.graphics.zp0, self.graphics.rp0)])
        {
            if is_pedantic {
                return Err(HintErrorKind::InvalidPointIndex(self.graphics.rp0));
            }
            for _ in 0..count {
                self.value_stack.pop()?;
            }
            return Ok(());
        }
        for _ in 0..count {
            let p = self.value_stack.pop_usize()?;
            let gs = &mut self.graphics;
            if !gs.in_bounds([(gs.zp1, p)]) {
                if is_pedantic {
                    return Err(HintErrorKind::InvalidPointIndex(p));
                }
                continue;
            }
            let distance = gs.project(gs.zp1().point(p)?, gs.zp0().point(gs.rp0)?);
            gs.move_point(gs.zp1, p, -distance)?;
        }
        Ok(())
    }

    /// ALIGNPTS[] (0x27): move both popped points to the projected
    /// midpoint between them, each along the freedom vector.
    ///
    /// in: p1 (point in the zp0 zone), p2 (point in the zp1 zone)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#align-points>
    pub(super) fn op_alignpts(&mut self) -> OpResult {
        let p2 = self.value_stack.pop_usize()?;
        let p1 = self.value_stack.pop_usize()?;
        let gs = &mut self.graphics;
        if !gs.in_bounds([(gs.zp1, p2), (gs.zp0, p1)]) {
            return if gs.is_pedantic {
                Err(HintErrorKind::InvalidPointIndex(p1.max(p2)))
            } else {
                Ok(())
            };
        }
        let distance = F26Dot6::from_bits(
            gs.project(gs.zp1().point(p2)?, gs.zp0().point(p1)?)
                .to_bits()
                / 2,
        );
        gs.move_point(gs.zp1, p2, distance)?;
        gs.move_point(gs.zp0, p1, -distance)?;
        Ok(())
    }

    /// UTP[] (0x29): clear the touched marker of point p on the axes the
    /// freedom vector has a component on.
    ///
    /// in: p (point number in the zp0 zone)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#untouch-point>
    pub(super) fn op_utp(&mut self) -> OpResult {
        let p = self.value_stack.pop_usize()?;
        let fv = self.graphics.freedom_vector;
        let axis = match (fv.x != 0, fv.y != 0) {
            (true, true) => CoordAxis::Both,
            (true, false) => CoordAxis::X,
            (false, true) => CoordAxis::Y,
            (false, false) => return Ok(()),
        };
        let is_pedantic = self.graphics.is_pedantic;
        let result = self.graphics.zp0_mut().untouch(p, axis);
        if is_pedantic {
            result
        } else {
            Ok(())
        }
    }

    /// IUP[a] (0x30..=0x31): per contour, drag untouched points along with
    /// their touched neighbors, preserving the original relationship. Bit
    /// 0 selects the x axis, otherwise y.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#interpolate-untouched-points-through-the-outline>
    pub(super) fn op_iup(&mut self, opcode: u8) -> OpResult {
        let axis = if (opcode & 1) != 0 {
            CoordAxis::X
        } else {
            CoordAxis::Y
        };
        self.graphics.zone_mut(ZonePointer::Glyph).iup(axis)
    }

    /// IP[] (0x39): reposition each popped point so its projected
    /// relationship to rp1 and rp2 matches the original outline. Repeats
    /// per the loop counter.
    ///
    /// in: p1..pn (points in the zp2 zone)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#interpolate-point-by-the-last-relative-stretch>
    pub(super) fn op_ip(&mut self) -> OpResult {
        let count = self.graphics.loop_counter as usize;
        self.graphics.loop_counter = 1;
        let is_pedantic = self.graphics.is_pedantic;
        let gs = &mut self.graphics;
        if !gs.in_bounds([(gs.zp0, gs.rp1), (gs.zp1, gs.rp2)]) {
            if is_pedantic {
                return Err(HintErrorKind::InvalidPointIndex(gs.rp1.max(gs.rp2)));
            }
            for _ in 0..count {
                self.value_stack.pop()?;
            }
            return Ok(());
        }
        let in_twilight =
            gs.zp0.is_twilight() || gs.zp1.is_twilight() || gs.zp2.is_twilight();
        let cur_base = gs.zp0().point(gs.rp1)?;
        let cur_range = gs.project(gs.zp1().point(gs.rp2)?, cur_base);
        // The old range is computed in the original outline; for points in
        // the glyph zone the unscaled outline is used for better precision.
        let (old_range, old_base, old_base_unscaled) = if in_twilight {
            let base = gs.zp0().original(gs.rp1)?;
            let range = gs.dual_project(gs.zp1().original(gs.rp2)?, base);
            (range.to_bits(), base, Point::default())
        } else {
            let base = gs.zp0().unscaled(gs.rp1);
            let range = gs.dual_project_unscaled(gs.zp1().unscaled(gs.rp2), base);
            (range, Point::default(), base)
        };
        for _ in 0..count {
            let p = self.value_stack.pop_usize()?;
            if !gs.in_bounds([(gs.zp2, p)]) {
                if is_pedantic {
                    return Err(HintErrorKind::InvalidPointIndex(p));
                }
                continue;
            }
            let original_distance = if in_twilight {
                gs.dual_project(gs.zp2().original(p)?, old_base).to_bits()
            } else {
                gs.dual_project_unscaled(gs.zp2().unscaled(p), old_base_unscaled)
            };
            let current_distance = gs.project(gs.zp2().point(p)?, cur_base);
            let new_distance = if original_distance != 0 {
                if old_range != 0 {
                    F26Dot6::from_bits(math::mul_div(
                        original_distance,
                        cur_range.to_bits(),
                        old_range,
                    ))
                } else {
                    F26Dot6::from_bits(original_distance)
                }
            } else {
                F26Dot6::ZERO
            };
            gs.move_point(gs.zp2, p, new_distance.wrapping_sub(current_distance))?;
        }
        Ok(())
    }

    /// ISECT[] (0x0F): put point p where line A (a0, a1 in the zp1 zone)
    /// crosses line B (b0, b1 in the zp0 zone). Nearly parallel lines fall
    /// back to the mean of the four endpoints.
    ///
    /// in: a0, a1, b0, b1, p
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#moves-point-p-to-the-intersection-of-two-lines>
    pub(super) fn op_isect(&mut self) -> OpResult {
        let b1 = self.value_stack.pop_usize()?;
        let b0 = self.value_stack.pop_usize()?;
        let a1 = self.value_stack.pop_usize()?;
        let a0 = self.value_stack.pop_usize()?;
        let p = self.value_stack.pop_usize()?;
        let gs = &mut self.graphics;
        if !gs.in_bounds([(gs.zp1, a0), (gs.zp1, a1), (gs.zp0, b0), (gs.zp0, b1), (gs.zp2, p)]) {
            return if gs.is_pedantic {
                Err(HintErrorKind::InvalidPointIndex(p))
            } else {
                Ok(())
            };
        }
        let pa0 = gs.zp1().point(a0)?.map(F26Dot6::to_bits);
        let pa1 = gs.zp1().point(a1)?.map(F26Dot6::to_bits);
        let pb0 = gs.zp0().point(b0)?.map(F26Dot6::to_bits);
        let pb1 = gs.zp0().point(b1)?.map(F26Dot6::to_bits);
        let dbx = pb1.x - pb0.x;
        let dby = pb1.y - pb0.y;
        let dax = pa1.x - pa0.x;
        let day = pa1.y - pa0.y;
        let dx = pb0.x - pa0.x;
        let dy = pb0.y - pa0.y;
        let discriminant =
            math::mul_div(dax, -dby, 0x40).wrapping_add(math::mul_div(day, dbx, 0x40));
        let dot_product =
            math::mul_div(dax, dbx, 0x40).wrapping_add(math::mul_div(day, dby, 0x40));
        // Lines are close to parallel when 19 * |discriminant| <= |dp|,
        // corresponding to an angle smaller than about 3 degrees.
        let new_point = if 19 * discriminant.abs() > dot_product.abs() {
            let v = math::mul_div(dx, -dby, 0x40).wrapping_add(math::mul_div(dy, dbx, 0x40));
            let rx = math::mul_div(v, dax, discriminant);
            let ry = math::mul_div(v, day, discriminant);
            Point::new(pa0.x + rx, pa0.y + ry)
        } else {
            Point::new(
                (pa0.x + pa1.x + pb0.x + pb1.x) / 4,
                (pa0.y + pa1.y + pb0.y + pb1.y) / 4,
            )
        };
        *gs.zp2_mut().point_mut(p)? = new_point.map(F26Dot6::from_bits);
        gs.zp2_mut().touch(p, CoordAxis::Both)?;
        Ok(())
    }

    fn set_on_curve_for_range(&mut self, on: bool) -> OpResult {
        let high = self.value_stack.pop_usize()?;
        let low = self.value_stack.pop_usize()?;
        let is_pedantic = self.graphics.is_pedantic;
        let zone = self.graphics.zone_mut(ZonePointer::Glyph);
        if high >= zone.points.len() || low > high {
            return if is_pedantic {
                Err(HintErrorKind::InvalidPointRange(low, high))
            } else {
                Ok(())
            };
        }
        zone.set_on_curve(low, high + 1, on)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        super::{super::zone::ZonePointer, MockEngine},
        CoordAxis, F26Dot6,
    };

    #[test]
    fn flip_point() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        // All points start off curve in the mock engine.
        for p in [0, 2, 30] {
            engine.value_stack.push(p).unwrap();
        }
        engine.graphics.loop_counter = 3;
        engine.op_flippt().unwrap();
        let zone = engine.graphics.zone_mut(ZonePointer::Glyph);
        for p in [0, 2, 30] {
            assert!(zone.flags[p].is_on_curve());
        }
        assert!(!zone.flags[1].is_on_curve());
        // The loop counter always resets.
        assert_eq!(engine.graphics.loop_counter, 1);
    }

    #[test]
    fn flip_range_on_off() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        engine.value_stack.push(10).unwrap();
        engine.value_stack.push(20).unwrap();
        engine.op_fliprgon().unwrap();
        let zone = engine.graphics.zone_mut(ZonePointer::Glyph);
        for p in 10..=20 {
            assert!(zone.flags[p].is_on_curve());
        }
        engine.value_stack.push(12).unwrap();
        engine.value_stack.push(15).unwrap();
        engine.op_fliprgoff().unwrap();
        let zone = engine.graphics.zone_mut(ZonePointer::Glyph);
        for p in 12..=15 {
            assert!(!zone.flags[p].is_on_curve());
        }
        assert!(zone.flags[10].is_on_curve());
        assert!(zone.flags[16].is_on_curve());
    }

    #[test]
    fn untouch_point() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        let zone = engine.graphics.zone_mut(ZonePointer::Glyph);
        zone.touch(5, CoordAxis::Both).unwrap();
        assert!(zone.is_touched(5, CoordAxis::Both).unwrap());
        // Default freedom vector is the x axis.
        engine.value_stack.push(5).unwrap();
        engine.op_utp().unwrap();
        let zone = engine.graphics.zone_mut(ZonePointer::Glyph);
        assert!(!zone.is_touched(5, CoordAxis::X).unwrap());
        assert!(zone.is_touched(5, CoordAxis::Y).unwrap());
    }

    #[test]
    fn shpix_moves_along_freedom_vector() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        engine.graphics.zp2 = ZonePointer::Glyph;
        let start = engine.graphics.zp2().point(4).unwrap();
        engine.value_stack.push(4).unwrap();
        engine.value_stack.push(64).unwrap();
        engine.op_shpix().unwrap();
        let end = engine.graphics.zp2().point(4).unwrap();
        // Freedom vector is the x axis so the point moves one pixel in x.
        assert_eq!(end.x, start.x + F26Dot6::from_bits(64));
        assert_eq!(end.y, start.y);
        assert!(engine
            .graphics
            .zp2()
            .is_touched(4, CoordAxis::X)
            .unwrap());
    }

    #[test]
    fn mdap_rounds_point() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        engine.graphics.zp0 = ZonePointer::Glyph;
        *engine.graphics.zp0_mut().point_mut(3).unwrap() =
            font_types::Point::new(F26Dot6::from_bits(100), F26Dot6::ZERO);
        engine.value_stack.push(3).unwrap();
        engine.op_mdap(0x2F).unwrap();
        // 100/64 rounds to 128/64
        assert_eq!(
            engine.graphics.zp0().point(3).unwrap().x,
            F26Dot6::from_bits(128)
        );
        assert_eq!(engine.graphics.rp0, 3);
        assert_eq!(engine.graphics.rp1, 3);
    }

    #[test]
    fn msirp_sets_distance() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        engine.graphics.zp0 = ZonePointer::Glyph;
        engine.graphics.zp1 = ZonePointer::Glyph;
        engine.graphics.rp0 = 0;
        *engine.graphics.zp0_mut().point_mut(0).unwrap() =
            font_types::Point::new(F26Dot6::from_bits(64), F26Dot6::ZERO);
        *engine.graphics.zp1_mut().point_mut(6).unwrap() =
            font_types::Point::new(F26Dot6::from_bits(100), F26Dot6::ZERO);
        engine.value_stack.push(6).unwrap();
        engine.value_stack.push(128).unwrap();
        engine.op_msirp(0x3B).unwrap();
        // point 6 now sits 2 pixels from rp0
        assert_eq!(
            engine.graphics.zp1().point(6).unwrap().x,
            F26Dot6::from_bits(64 + 128)
        );
        assert_eq!(engine.graphics.rp0, 6);
        assert_eq!(engine.graphics.rp2, 6);
    }

    #[test]
    fn isect_intersection() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        engine.graphics.zp0 = ZonePointer::Glyph;
        engine.graphics.zp1 = ZonePointer::Glyph;
        engine.graphics.zp2 = ZonePointer::Glyph;
        let points: [(i32, i32); 4] = [
            // line A: vertical through x = 1.0
            (64, -64),
            (64, 64),
            // line B: horizontal through y = 0.5
            (0, 32),
            (128, 32),
        ];
        for (i, (x, y)) in points.iter().enumerate() {
            *engine.graphics.zp1_mut().point_mut(i).unwrap() =
                font_types::Point::new(F26Dot6::from_bits(*x), F26Dot6::from_bits(*y));
        }
        for value in [8, 0, 1, 2, 3] {
            engine.value_stack.push(value).unwrap();
        }
        engine.op_isect().unwrap();
        let result = engine.graphics.zp2().point(8).unwrap();
        assert_eq!(result.x, F26Dot6::from_bits(64));
        assert_eq!(result.y, F26Dot6::from_bits(32));
    }
}
