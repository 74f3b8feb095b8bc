use chrono::NaiveDate;
use tinyvec::ArrayVec;

use super::{
    tokenizer::{parse_degrees, parse_float, parse_int, NmeaTokenizer},
    Constellation, FixFlags, GnssFix, GnssStatus, SvInfo, SvStatus, MAX_SV_PRN, NMEA_MAX_SIZE,
};
use crate::HostClock;

/// Shortest sentence worth tokenizing, terminator included.
const MIN_SENTENCE_LEN: usize = 9;

/// Receivers report a DOP of exactly 99.99 when the estimate is unknown.
const DOP_UNKNOWN: f64 = 99.99;

pub type LocationSink<'s> = &'s mut dyn FnMut(&GnssFix);
pub type StatusSink<'s> = &'s mut dyn FnMut(GnssStatus);
pub type NmeaSink<'s> = &'s mut dyn FnMut(i64, &[u8]);
pub type SatelliteSink<'s> = &'s mut dyn FnMut(&SvStatus);

/// Reassembles a raw serial byte stream into NMEA sentences and folds them
/// into an accumulating fix, satellite list, and status, delivered through
/// the attached sinks.
///
/// One reader per stream: neither the buffer nor the accumulated state is
/// synchronized, and sinks are invoked synchronously from [`feed`].
///
/// [`feed`]: NmeaReader::feed
pub struct NmeaReader<'s, C> {
    buf: ArrayVec<[u8; NMEA_MAX_SIZE]>,
    overflow: bool,
    clock: C,
    utc_date: Option<NaiveDate>,
    fix: GnssFix,
    sv_status: SvStatus,
    /// Satellites seen so far in the current GSV group; keeps counting past
    /// the list capacity.
    sv_num: usize,
    sv_changed: bool,
    used_in_fix: [bool; MAX_SV_PRN],
    location_sink: Option<LocationSink<'s>>,
    status_sink: Option<StatusSink<'s>>,
    nmea_sink: Option<NmeaSink<'s>>,
    satellite_sink: Option<SatelliteSink<'s>>,
}

impl<'s, C: HostClock> NmeaReader<'s, C> {
    pub fn new(clock: C) -> Self {
        Self {
            buf: ArrayVec::new(),
            overflow: false,
            clock,
            utc_date: None,
            fix: GnssFix::default(),
            sv_status: SvStatus::default(),
            sv_num: 0,
            sv_changed: false,
            used_in_fix: [false; MAX_SV_PRN],
            location_sink: None,
            status_sink: None,
            nmea_sink: None,
            satellite_sink: None,
        }
    }

    /// Attach or detach the location sink. A fix buffered while no sink was
    /// attached is delivered immediately, once.
    pub fn set_location_sink(&mut self, sink: Option<LocationSink<'s>>) {
        self.location_sink = sink;
        if let Some(cb) = self.location_sink.as_mut() {
            if !self.fix.flags.is_empty() {
                cb(&self.fix);
                self.fix.flags.clear();
            }
        }
    }

    pub fn set_status_sink(&mut self, sink: Option<StatusSink<'s>>) {
        self.status_sink = sink;
    }

    pub fn set_nmea_sink(&mut self, sink: Option<NmeaSink<'s>>) {
        self.nmea_sink = sink;
    }

    pub fn set_satellite_sink(&mut self, sink: Option<SatelliteSink<'s>>) {
        self.satellite_sink = sink;
    }

    /// Forward a session-state transition to the status sink, if attached.
    pub fn notify_status(&mut self, status: GnssStatus) {
        if let Some(cb) = self.status_sink.as_mut() {
            cb(status);
        }
    }

    /// Push one raw serial byte. Complete lines are parsed and delivered;
    /// lines longer than the buffer are discarded up to the next newline.
    pub fn feed(&mut self, byte: u8) {
        if self.overflow {
            self.overflow = byte != b'\n';
            return;
        }

        if self.buf.len() == self.buf.capacity() {
            #[cfg(feature = "defmt")]
            defmt::warn!("nmea line overflow, discarding until newline");
            self.overflow = true;
            self.buf.clear();
            return;
        }

        self.buf.push(byte);

        if byte == b'\n' {
            self.parse_sentence();
            if let Some(cb) = self.nmea_sink.as_mut() {
                // stamped with the fix record's current timestamp, which can
                // trail the line that was just parsed
                cb(self.fix.timestamp, &self.buf);
            }
            self.buf.clear();
        }
    }

    fn parse_sentence(&mut self) {
        if self.buf.len() < MIN_SENTENCE_LEN {
            #[cfg(feature = "defmt")]
            defmt::trace!("sentence too short, discarded");
            return;
        }

        // tokens index into a snapshot of the line
        let line = self.buf;
        let tzer = NmeaTokenizer::new(&line);

        let id = tzer.get(0).bytes(&line);
        if id.len() < 5 {
            return;
        }
        let constellation = Constellation::from_talker(id);

        match &id[2..5] {
            b"GGA" => self.parse_gga(&line, &tzer),
            b"GSA" => self.parse_gsa(&line, &tzer, constellation),
            b"RMC" => self.parse_rmc(&line, &tzer),
            b"GSV" => self.parse_gsv(&line, &tzer, constellation),
            _ => {}
        }

        if self.fix.flags.contains(FixFlags::LAT_LONG) {
            // downstream consumers expect a fully-populated record whenever
            // a position is present
            self.fix.flags.insert(
                FixFlags::ALTITUDE | FixFlags::SPEED | FixFlags::BEARING | FixFlags::ACCURACY,
            );
            if let Some(cb) = self.location_sink.as_mut() {
                cb(&self.fix);
                self.fix.flags.clear();
            }
        }

        if self.sv_changed {
            self.sv_changed = false;
            self.fold_used_in_fix();
            if let Some(cb) = self.satellite_sink.as_mut() {
                cb(&self.sv_status);
            }
            // consumed whether or not anyone was listening
            self.sv_status.sv_list.clear();
            self.used_in_fix = [false; MAX_SV_PRN];
        }
    }

    fn parse_gga(&mut self, line: &[u8], tzer: &NmeaTokenizer) {
        if tzer.get(6).bytes(line).first() == Some(&b'1') {
            self.update_time(tzer.get(1).bytes(line));
            self.update_latlong(
                tzer.get(2).bytes(line),
                first_byte(tzer.get(3).bytes(line)),
                tzer.get(4).bytes(line),
                first_byte(tzer.get(5).bytes(line)),
            );
            self.update_altitude(tzer.get(9).bytes(line));
        }
        // a new epoch starts here whether or not the fix was usable
        self.used_in_fix = [false; MAX_SV_PRN];
    }

    fn parse_gsa(&mut self, line: &[u8], tzer: &NmeaTokenizer, constellation: Constellation) {
        let mode = tzer.get(2).bytes(line);
        if mode.is_empty() || mode[0] == b'1' {
            return;
        }

        self.update_accuracy(tzer.get(15).bytes(line));

        for slot in 3..=14 {
            let prn = parse_int(tzer.get(slot).bytes(line));
            if prn < 0 {
                continue;
            }
            let prn = constellation.shift_prn(prn);
            if (1..MAX_SV_PRN as i32).contains(&prn) {
                self.used_in_fix[prn as usize] = true;
            }
        }
    }

    fn parse_rmc(&mut self, line: &[u8], tzer: &NmeaTokenizer) {
        if tzer.get(2).bytes(line).first() == Some(&b'A') {
            self.update_date(tzer.get(9).bytes(line), tzer.get(1).bytes(line));
            self.update_latlong(
                tzer.get(3).bytes(line),
                first_byte(tzer.get(4).bytes(line)),
                tzer.get(5).bytes(line),
                first_byte(tzer.get(6).bytes(line)),
            );
            self.update_bearing(tzer.get(8).bytes(line));
            self.update_speed(tzer.get(7).bytes(line));
        }
        // RMC closes the cycle; flush the visibility list next
        self.sv_changed = true;
    }

    fn parse_gsv(&mut self, line: &[u8], tzer: &NmeaTokenizer, constellation: Constellation) {
        let announced = parse_int(tzer.get(3).bytes(line));
        if announced <= 0 {
            return;
        }

        if parse_int(tzer.get(2).bytes(line)) == 1 {
            self.sv_num = 0;
        }

        let mut block = 0;
        while block < 4 && self.sv_num < announced as usize {
            let base = block * 4 + 4;
            let info = SvInfo {
                prn: constellation.shift_prn(parse_int(tzer.get(base).bytes(line))),
                elevation: parse_float(tzer.get(base + 1).bytes(line)) as f32,
                azimuth: parse_float(tzer.get(base + 2).bytes(line)) as f32,
                snr: parse_float(tzer.get(base + 3).bytes(line)) as f32,
            };
            // the tail stops at capacity, the running count does not
            let _ = self.sv_status.sv_list.try_push(info);
            self.sv_num += 1;
            block += 1;
        }
    }

    fn update_time(&mut self, field: &[u8]) {
        if field.len() < 6 {
            return;
        }

        let date = match self.utc_date {
            Some(date) => date,
            None => {
                // no date sentence yet; borrow today's from the host clock
                let date = self.clock.now_utc().date();
                self.utc_date = Some(date);
                date
            }
        };

        let hour = parse_int(&field[..2]);
        let minute = parse_int(&field[2..4]);
        let seconds = parse_float(&field[4..]);
        if hour < 0 || minute < 0 {
            return;
        }
        if let Some(t) = date.and_hms_opt(hour as u32, minute as u32, seconds as u32) {
            self.fix.timestamp = t.and_utc().timestamp_millis();
        }
    }

    fn update_date(&mut self, date_field: &[u8], time_field: &[u8]) {
        if date_field.len() != 6 {
            return;
        }
        let day = parse_int(&date_field[..2]);
        let mon = parse_int(&date_field[2..4]);
        let year = parse_int(&date_field[4..6]);
        if day < 0 || mon < 0 || year < 0 {
            return;
        }
        match NaiveDate::from_ymd_opt(2000 + year, mon as u32, day as u32) {
            Some(date) => self.utc_date = Some(date),
            None => return,
        }
        self.update_time(time_field);
    }

    fn update_latlong(&mut self, lat: &[u8], lat_hemi: u8, lon: &[u8], lon_hemi: u8) {
        if lat.len() < 6 || lon.len() < 6 {
            return;
        }
        let mut latitude = parse_degrees(lat);
        if lat_hemi == b'S' {
            latitude = -latitude;
        }
        let mut longitude = parse_degrees(lon);
        if lon_hemi == b'W' {
            longitude = -longitude;
        }
        self.fix.latitude = latitude;
        self.fix.longitude = longitude;
        self.fix.flags.insert(FixFlags::LAT_LONG);
    }

    fn update_altitude(&mut self, field: &[u8]) {
        if field.is_empty() {
            return;
        }
        self.fix.altitude = parse_float(field);
        self.fix.flags.insert(FixFlags::ALTITUDE);
    }

    fn update_accuracy(&mut self, field: &[u8]) {
        if field.is_empty() {
            return;
        }
        let accuracy = parse_float(field);
        self.fix.accuracy = accuracy as f32;
        // keep the placeholder value but don't vouch for it
        if accuracy == DOP_UNKNOWN {
            return;
        }
        self.fix.flags.insert(FixFlags::ACCURACY);
    }

    fn update_bearing(&mut self, field: &[u8]) {
        if field.is_empty() {
            return;
        }
        self.fix.bearing = parse_float(field) as f32;
        self.fix.flags.insert(FixFlags::BEARING);
    }

    fn update_speed(&mut self, field: &[u8]) {
        if field.is_empty() {
            return;
        }
        // the wire value is knots
        self.fix.speed = (parse_float(field) / 1.85) as f32;
        self.fix.flags.insert(FixFlags::SPEED);
    }

    /// Mark used-in-fix satellites by adding 720 to their (truncated)
    /// azimuth, the encoding the downstream consumer expects.
    fn fold_used_in_fix(&mut self) {
        for info in self.sv_status.sv_list.iter_mut() {
            info.azimuth = info.azimuth as i32 as f32;
            if (0..MAX_SV_PRN as i32).contains(&info.prn) && self.used_in_fix[info.prn as usize] {
                info.azimuth += 720.0;
            }
        }
    }
}

fn first_byte(field: &[u8]) -> u8 {
    field.first().copied().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FixedClock;
    use chrono::NaiveDateTime;

    fn clock() -> FixedClock {
        FixedClock(date(2023, 3, 15).and_hms_opt(9, 30, 0).unwrap())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn epoch_ms(dt: NaiveDateTime) -> i64 {
        dt.and_utc().timestamp_millis()
    }

    fn feed_line(reader: &mut NmeaReader<FixedClock>, line: &str) {
        for b in line.bytes() {
            reader.feed(b);
        }
    }

    const GGA: &str = "$GPGGA,123456.00,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n";
    const GGA_NO_FIX: &str = "$GPGGA,123456.00,4807.038,N,01131.000,E,0,00,,,M,,M,,*4C\r\n";
    const RMC: &str =
        "$GPRMC,081836.00,A,3751.65,S,14507.36,E,000.5,360.0,130923,011.3,E*62\r\n";
    const RMC_VOID: &str = "$GPRMC,081836.00,V,,,,,,,130923,,,N*45\r\n";
    const GSA: &str = "$GPGSA,A,3,04,05,,09,12,,,24,,,,,2.5,1.3,2.1*39\r\n";

    #[test]
    fn gga_delivers_full_fix() {
        let mut fixes: Vec<GnssFix> = Vec::new();
        {
            let mut on_fix = |fix: &GnssFix| fixes.push(*fix);
            let mut reader = NmeaReader::new(clock());
            reader.set_location_sink(Some(&mut on_fix));
            feed_line(&mut reader, GGA);
        }
        assert_eq!(fixes.len(), 1);
        let fix = fixes[0];
        assert!((fix.latitude - 48.1173).abs() < 1e-6);
        assert!((fix.longitude - 11.516_666_666).abs() < 1e-6);
        assert_eq!(fix.altitude, 545.4);
        // the date is seeded from the host clock when no RMC has been seen
        assert_eq!(
            fix.timestamp,
            epoch_ms(date(2023, 3, 15).and_hms_opt(12, 34, 56).unwrap())
        );
        // a delivered position always claims every field
        for flag in [
            FixFlags::LAT_LONG,
            FixFlags::ALTITUDE,
            FixFlags::SPEED,
            FixFlags::BEARING,
            FixFlags::ACCURACY,
        ] {
            assert!(fix.flags.contains(flag));
        }
    }

    #[test]
    fn gga_without_fix_quality_updates_nothing() {
        let mut count = 0;
        {
            let mut on_fix = |_: &GnssFix| count += 1;
            let mut reader = NmeaReader::new(clock());
            reader.set_location_sink(Some(&mut on_fix));
            feed_line(&mut reader, GGA_NO_FIX);
            assert!(reader.fix.flags.is_empty());
            assert_eq!(reader.fix.timestamp, 0);
        }
        assert_eq!(count, 0);
    }

    #[test]
    fn rmc_carries_its_own_date() {
        let mut fixes: Vec<GnssFix> = Vec::new();
        {
            let mut on_fix = |fix: &GnssFix| fixes.push(*fix);
            let mut reader = NmeaReader::new(clock());
            reader.set_location_sink(Some(&mut on_fix));
            feed_line(&mut reader, RMC);
        }
        assert_eq!(fixes.len(), 1);
        let fix = fixes[0];
        assert!((fix.latitude + 37.860_833_333).abs() < 1e-6);
        assert!((fix.longitude - 145.122_666_666).abs() < 1e-6);
        assert_eq!(
            fix.timestamp,
            epoch_ms(date(2023, 9, 13).and_hms_opt(8, 18, 36).unwrap())
        );
        assert!((f64::from(fix.speed) - 0.5 / 1.85).abs() < 1e-6);
        assert_eq!(fix.bearing, 360.0);
    }

    #[test]
    fn void_rmc_still_schedules_satellite_delivery() {
        let mut fix_count = 0;
        let mut sv_count = 0;
        {
            let mut on_fix = |_: &GnssFix| fix_count += 1;
            let mut on_sv = |_: &SvStatus| sv_count += 1;
            let mut reader = NmeaReader::new(clock());
            reader.set_location_sink(Some(&mut on_fix));
            reader.set_satellite_sink(Some(&mut on_sv));
            feed_line(&mut reader, RMC_VOID);
        }
        assert_eq!(fix_count, 0);
        assert_eq!(sv_count, 1);
    }

    #[test]
    fn gsv_group_accumulates_across_sentences() {
        let mut reader = NmeaReader::new(clock());
        feed_line(
            &mut reader,
            "$GPGSV,2,1,07,04,71,041,44,05,30,213,41,09,62,295,43,12,11,110,38*7C\r\n",
        );
        feed_line(
            &mut reader,
            "$GPGSV,2,2,07,24,09,056,33,25,44,172,40,29,18,316,35*4A\r\n",
        );
        assert_eq!(reader.sv_num, 7);
        assert_eq!(reader.sv_status.num_svs(), 7);
        assert_eq!(reader.sv_status.sv_list[0].prn, 4);
        assert_eq!(reader.sv_status.sv_list[6].prn, 29);
        assert_eq!(reader.sv_status.sv_list[4].snr, 33.0);
    }

    #[test]
    fn gsv_tail_stops_at_capacity() {
        let mut reader = NmeaReader::new(clock());
        for sentence in 1..=10 {
            feed_line(
                &mut reader,
                &format!("$GPGSV,10,{sentence},40,01,10,100,30,02,10,100,30,03,10,100,30,04,10,100,30*70\r\n"),
            );
        }
        assert_eq!(reader.sv_num, 40);
        assert_eq!(reader.sv_status.num_svs(), crate::nmea::GNSS_MAX_SVS);
    }

    #[test]
    fn gsv_restart_resets_group_counter() {
        let mut reader = NmeaReader::new(clock());
        let line = "$GPGSV,2,1,07,04,71,041,44,05,30,213,41,09,62,295,43,12,11,110,38*7C\r\n";
        feed_line(&mut reader, line);
        feed_line(&mut reader, line);
        // the second sentence #1 restarts the group but appends to the list
        assert_eq!(reader.sv_num, 4);
        assert_eq!(reader.sv_status.num_svs(), 8);
    }

    #[test]
    fn used_in_fix_is_folded_into_azimuth() {
        let mut lists: Vec<SvStatus> = Vec::new();
        {
            let mut on_sv = |sv: &SvStatus| lists.push(*sv);
            let mut reader = NmeaReader::new(clock());
            reader.set_satellite_sink(Some(&mut on_sv));
            feed_line(&mut reader, GSA);
            feed_line(
                &mut reader,
                "$GPGSV,1,1,02,04,71,041,44,07,30,213,41*7E\r\n",
            );
            feed_line(&mut reader, RMC);
        }
        assert_eq!(lists.len(), 1);
        let list = &lists[0];
        assert_eq!(list.num_svs(), 2);
        // PRN 4 is in the GSA solution, PRN 7 is not
        assert_eq!(list.sv_list[0].azimuth, 41.0 + 720.0);
        assert_eq!(list.sv_list[1].azimuth, 213.0);
    }

    #[test]
    fn gga_starts_a_new_epoch_for_used_in_fix() {
        let mut lists: Vec<SvStatus> = Vec::new();
        {
            let mut on_sv = |sv: &SvStatus| lists.push(*sv);
            let mut reader = NmeaReader::new(clock());
            reader.set_satellite_sink(Some(&mut on_sv));
            feed_line(&mut reader, GSA);
            // the quality-0 sentence still clears the table
            feed_line(&mut reader, GGA_NO_FIX);
            feed_line(
                &mut reader,
                "$GPGSV,1,1,01,04,71,041,44*48\r\n",
            );
            feed_line(&mut reader, RMC_VOID);
        }
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].sv_list[0].azimuth, 41.0);
    }

    #[test]
    fn beidou_and_glonass_prns_are_biased() {
        let mut lists: Vec<SvStatus> = Vec::new();
        {
            let mut on_sv = |sv: &SvStatus| lists.push(*sv);
            let mut reader = NmeaReader::new(clock());
            reader.set_satellite_sink(Some(&mut on_sv));
            feed_line(&mut reader, "$BDGSA,A,3,05,,,,,,,,,,,,2.5,1.3,2.1*3C\r\n");
            feed_line(&mut reader, "$BDGSV,1,1,01,05,60,120,35*6B\r\n");
            feed_line(&mut reader, "$GLGSV,1,1,01,70,10,200,30*62\r\n");
            feed_line(&mut reader, RMC);
        }
        let list = &lists[0];
        assert_eq!(list.sv_list[0].prn, 205);
        // marked used under the biased PRN
        assert_eq!(list.sv_list[0].azimuth, 120.0 + 720.0);
        // GLONASS slot numbers at or past the bias stay as reported
        assert_eq!(list.sv_list[1].prn, 70);
    }

    #[test]
    fn prn_bias_is_idempotent() {
        assert_eq!(Constellation::Beidou.shift_prn(5), 205);
        assert_eq!(Constellation::Beidou.shift_prn(205), 205);
        assert_eq!(Constellation::Glonass.shift_prn(3), 67);
        assert_eq!(Constellation::Glonass.shift_prn(67), 67);
        assert_eq!(Constellation::Gps.shift_prn(12), 12);
        // the parse-failure sentinel passes through
        assert_eq!(Constellation::Beidou.shift_prn(-1), -1);
    }

    #[test]
    fn overflowing_line_is_discarded_without_contamination() {
        let mut fixes: Vec<GnssFix> = Vec::new();
        let mut raw: Vec<Vec<u8>> = Vec::new();
        {
            let mut on_fix = |fix: &GnssFix| fixes.push(*fix);
            let mut on_raw = |_ts: i64, line: &[u8]| raw.push(line.to_vec());
            let mut reader = NmeaReader::new(clock());
            reader.set_location_sink(Some(&mut on_fix));
            reader.set_nmea_sink(Some(&mut on_raw));
            for _ in 0..200 {
                reader.feed(b'A');
            }
            reader.feed(b'\n');
            feed_line(&mut reader, GGA);
        }
        assert_eq!(fixes.len(), 1);
        // only the well-formed line surfaced on the raw sink
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0], GGA.as_bytes());
    }

    #[test]
    fn attaching_location_sink_flushes_buffered_fix_once() {
        let mut count = 0;
        {
            let mut on_fix = |_: &GnssFix| count += 1;
            let mut reader = NmeaReader::new(clock());
            feed_line(&mut reader, GGA);
            reader.set_location_sink(Some(&mut on_fix));
            assert!(reader.fix.flags.is_empty());
        }
        assert_eq!(count, 1);

        // re-attaching with nothing buffered delivers nothing
        let mut count = 0;
        {
            let mut on_fix = |_: &GnssFix| count += 1;
            let mut reader = NmeaReader::new(clock());
            reader.set_location_sink(Some(&mut on_fix));
        }
        assert_eq!(count, 0);
    }

    #[test]
    fn gsa_dop_placeholder_withholds_accuracy_flag() {
        let mut flags: Vec<FixFlags> = Vec::new();
        {
            let mut on_fix = |fix: &GnssFix| flags.push(fix.flags);
            let mut reader = NmeaReader::new(clock());
            feed_line(&mut reader, "$GPGSA,A,3,04,,,,,,,,,,,,99.99,99.99,99.99*30\r\n");
            assert_eq!(reader.fix.accuracy, 99.99);
            // nothing valid buffered, so attaching must not flush
            reader.set_location_sink(Some(&mut on_fix));
        }
        assert!(flags.is_empty());

        let mut flags: Vec<FixFlags> = Vec::new();
        {
            let mut on_fix = |fix: &GnssFix| flags.push(fix.flags);
            let mut reader = NmeaReader::new(clock());
            feed_line(&mut reader, GSA);
            reader.set_location_sink(Some(&mut on_fix));
        }
        assert_eq!(flags, vec![FixFlags::ACCURACY]);
    }

    #[test]
    fn satellite_state_is_consumed_without_a_sink() {
        let mut lists: Vec<SvStatus> = Vec::new();
        {
            let mut on_sv = |sv: &SvStatus| lists.push(*sv);
            let mut reader = NmeaReader::new(clock());
            feed_line(&mut reader, GSA);
            feed_line(
                &mut reader,
                "$GPGSV,1,1,02,04,71,041,44,07,30,213,41*7E\r\n",
            );
            feed_line(&mut reader, RMC);
            // delivery already happened with no sink; state must be gone
            reader.set_satellite_sink(Some(&mut on_sv));
            feed_line(&mut reader, "$GPGSV,1,1,01,11,15,312,28*43\r\n");
            feed_line(&mut reader, RMC);
        }
        assert_eq!(lists.len(), 1);
        let list = &lists[0];
        assert_eq!(list.num_svs(), 1);
        assert_eq!(list.sv_list[0].prn, 11);
        // the old GSA marks were cleared along with the list
        assert_eq!(list.sv_list[0].azimuth, 312.0);
    }

    #[test]
    fn short_and_unknown_sentences_are_ignored() {
        let mut raw_count = 0;
        {
            let mut on_raw = |_: i64, _: &[u8]| raw_count += 1;
            let mut reader = NmeaReader::new(clock());
            reader.set_nmea_sink(Some(&mut on_raw));
            feed_line(&mut reader, "$GP\r\n");
            feed_line(&mut reader, "$GPZDA,081836.00,13,09,2023,00,00*68\r\n");
            assert!(reader.fix.flags.is_empty());
        }
        // raw lines are forwarded even when parsing ignores them
        assert_eq!(raw_count, 2);
    }

    #[test]
    fn raw_sink_timestamp_lags_the_current_line() {
        let mut stamps: Vec<i64> = Vec::new();
        {
            let mut on_raw = |ts: i64, _: &[u8]| stamps.push(ts);
            let mut reader = NmeaReader::new(clock());
            reader.set_nmea_sink(Some(&mut on_raw));
            feed_line(&mut reader, GGA);
            feed_line(&mut reader, "$GLGSV,1,1,01,70,10,200,30*62\r\n");
        }
        let gga_ts = epoch_ms(date(2023, 3, 15).and_hms_opt(12, 34, 56).unwrap());
        assert_eq!(stamps, vec![gga_ts, gga_ts]);
    }

    #[test]
    fn status_notifications_reach_the_sink() {
        let mut seen: Vec<GnssStatus> = Vec::new();
        {
            let mut on_status = |status: GnssStatus| seen.push(status);
            let mut reader = NmeaReader::new(clock());
            reader.notify_status(GnssStatus::SessionBegin);
            reader.set_status_sink(Some(&mut on_status));
            reader.notify_status(GnssStatus::SessionBegin);
            reader.notify_status(GnssStatus::SessionEnd);
        }
        assert_eq!(seen, vec![GnssStatus::SessionBegin, GnssStatus::SessionEnd]);
    }
}
