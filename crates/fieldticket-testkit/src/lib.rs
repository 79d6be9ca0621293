// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use fieldticket_app::{Lease, LeaseField, Tank, TankField, UniqId, UserTag, Well, WellField};
use std::path::PathBuf;

const LEASE_PREFIXES: [&str; 14] = [
    "North", "South", "East", "West", "Big", "Little", "Upper", "Lower", "Old", "New", "Red",
    "Dry", "Cedar", "Mesa",
];

const LEASE_NAMES: [&str; 16] = [
    "Permian",
    "Spraberry",
    "Wolfcamp",
    "Eagle Ford",
    "Barnett",
    "Caddo",
    "Midland",
    "Pecos",
    "Reeves",
    "Howard",
    "Glasscock",
    "Upton",
    "Crane",
    "Ector",
    "Martin",
    "Andrews",
];

const LEASE_SUFFIXES: [&str; 6] = ["Unit", "Lease", "Pad", "Ranch", "Battery", "Field"];

const DISTRICTS: [&str; 8] = ["01", "02", "03", "7B", "7C", "08", "8A", "09"];

const PURCHASERS: [&str; 8] = [
    "Plains Marketing",
    "Sunoco Logistics",
    "Enterprise Crude",
    "Shell Trading",
    "Delek",
    "Targa",
    "Oxy Midstream",
    "Permian Transport",
];

const TAGS: [(&str, &str); 6] = [
    ("HOT", "Hot oil"),
    ("CHEM", "Chemical treatment"),
    ("SWD", "Salt water disposal"),
    ("GL", "Gas lift"),
    ("ROD", "Rod pump"),
    ("ESP", "Submersible pump"),
];

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];

const TANK_SIZES: [&str; 5] = ["210", "300", "400", "500", "750"];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator for leases with tanks and wells. The same seed always
/// yields the same sequence.
#[derive(Debug, Clone)]
pub struct LeaseFaker {
    rng: DeterministicRng,
    next_uniq: u64,
}

impl LeaseFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_uniq: 1,
        }
    }

    /// Lease `number` with one to three tanks and one to four wells, all
    /// carrying server-assigned ids.
    pub fn lease(&mut self, number: usize) -> Lease {
        let mut lease = Lease::new(
            format!("{:04}", 1000 + number),
            format!(
                "{} {} {}",
                self.pick(&LEASE_PREFIXES),
                self.pick(&LEASE_NAMES),
                self.pick(&LEASE_SUFFIXES)
            ),
        );
        let pumper = format!("P{:02}", self.int_range(1, 12));
        let relief = format!("P{:02}", self.int_range(1, 12));
        let rrc = format!("{:06}", self.int_range(10_000, 999_999));
        let active = if self.rng.int_n(5) == 0 { "N" } else { "Y" };
        let district = self.pick(&DISTRICTS).to_owned();
        let purchaser = self.pick(&PURCHASERS).to_owned();
        lease.set_field(LeaseField::PumperId, pumper);
        lease.set_field(LeaseField::ReliefId, relief);
        lease.set_field(LeaseField::Rrc, rrc);
        lease.set_field(LeaseField::Active, active);
        lease.set_field(LeaseField::District, district);
        lease.set_field(LeaseField::Purchaser, purchaser);
        if self.rng.bool() {
            let (tag, _) = TAGS[self.rng.int_n(TAGS.len())];
            lease.set_field(LeaseField::Tag1, tag);
        }

        for _ in 0..self.int_range(1, 3) {
            let tank = self.tank(&lease);
            lease.tanks.push(tank);
        }
        for _ in 0..self.int_range(1, 4) {
            let well = self.well(&lease);
            lease.wells.push(well);
        }
        lease
    }

    pub fn leases(&mut self, count: usize) -> Vec<Lease> {
        (0..count).map(|number| self.lease(number)).collect()
    }

    pub fn tank(&mut self, lease: &Lease) -> Tank {
        let number = lease.tanks.len() + 1;
        let size = self.pick(&TANK_SIZES);
        let mut tank = Tank::draft(&lease.id)
            .with_field(TankField::TankId, format!("{}-{number}", lease.id))
            .with_field(TankField::Size, size)
            .with_field(TankField::BblsPerInch, format!("{:.2}", self.bbls_per_inch(size)));
        tank.uniq_id = self.uniq_id("T");
        tank
    }

    pub fn well(&mut self, lease: &Lease) -> Well {
        let number = lease.wells.len() + 1;
        let api = format!("42-{:03}-{:05}", self.int_range(1, 507), self.int_range(0, 99_999));
        let mut well = Well::draft(&lease.id)
            .with_field(WellField::WellId, format!("{number}H"))
            .with_field(WellField::Api, api)
            .with_field(WellField::AllocPct, format!("{}", self.int_range(10, 100)));
        well.uniq_id = self.uniq_id("W");
        well
    }

    /// Option rows mixing tags, pumpers and operators, shaped like the
    /// combined user/tag listing.
    pub fn user_tags(&mut self, pumpers: usize) -> Vec<UserTag> {
        let mut rows: Vec<UserTag> = TAGS
            .iter()
            .map(|(id, desc)| UserTag {
                user_id: None,
                full_name: None,
                role: None,
                tag_id: Some((*id).to_owned()),
                tag_desc: Some((*desc).to_owned()),
            })
            .collect();
        for number in 1..=pumpers {
            rows.push(self.user(format!("P{number:02}"), "P"));
        }
        rows.push(self.user("O01".to_owned(), "O"));
        rows
    }

    fn user(&mut self, user_id: String, role: &str) -> UserTag {
        UserTag {
            user_id: Some(user_id),
            full_name: Some(format!(
                "{} {}",
                self.pick(&FIRST_NAMES),
                self.pick(&LAST_NAMES)
            )),
            role: Some(role.to_owned()),
            tag_id: None,
            tag_desc: None,
        }
    }

    fn uniq_id(&mut self, prefix: &str) -> UniqId {
        let id = UniqId::new(format!("{prefix}{}", self.next_uniq));
        self.next_uniq += 1;
        id
    }

    fn bbls_per_inch(&mut self, size: &str) -> f64 {
        let barrels = size.parse::<f64>().unwrap_or(400.0);
        barrels / (180.0 + self.int_range(0, 60) as f64)
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range(&mut self, min: usize, max: usize) -> usize {
        if max <= min {
            return min;
        }
        min + self.rng.int_n(max - min + 1)
    }
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("fieldticket.db");
    Ok((dir, db_path))
}

#[cfg(test)]
mod tests {
    use super::{LeaseFaker, TAGS};
    use fieldticket_app::{LeaseField, OptionSets, validate_lease};
    use std::collections::BTreeSet;

    #[test]
    fn new_deterministic_seed() {
        let mut left = LeaseFaker::new(42);
        let mut right = LeaseFaker::new(42);
        assert_eq!(left.leases(5), right.leases(5));
    }

    #[test]
    fn different_seeds_diverge() {
        let left = LeaseFaker::new(1).leases(8);
        let right = LeaseFaker::new(2).leases(8);
        assert_ne!(left, right);
    }

    #[test]
    fn lease_has_valid_nested_rows() {
        let mut faker = LeaseFaker::new(7);
        for lease in faker.leases(20) {
            assert!(!lease.name.is_empty());
            assert!((1..=3).contains(&lease.tanks.len()));
            assert!((1..=4).contains(&lease.wells.len()));
            assert!(lease.field(LeaseField::Rrc).is_some_and(|rrc| rrc.len() == 6));
            assert!(validate_lease(&lease).is_ok(), "{}", lease.id);
        }
    }

    #[test]
    fn uniq_ids_are_unique_and_persisted() {
        let mut faker = LeaseFaker::new(3);
        let leases = faker.leases(10);
        let mut seen = BTreeSet::new();
        for lease in &leases {
            for tank in &lease.tanks {
                assert!(!tank.uniq_id.is_draft());
                assert!(seen.insert(tank.uniq_id.clone()));
            }
            for well in &lease.wells {
                assert!(!well.uniq_id.is_draft());
                assert!(seen.insert(well.uniq_id.clone()));
            }
        }
    }

    #[test]
    fn user_tags_split_into_option_sets() {
        let mut faker = LeaseFaker::new(5);
        let options = OptionSets::from_tags(&faker.user_tags(4));
        assert_eq!(options.tags.len(), TAGS.len());
        assert_eq!(options.pumpers.len(), 4);
        assert!(options.pumper_name("O01").is_none());
    }
}
