use serde::Serialize;

/// Compass orientation of the shoreline, as seen from the sand looking out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

impl Facing {
    pub fn as_str(self) -> &'static str {
        match self {
            Facing::North => "north",
            Facing::Northeast => "northeast",
            Facing::East => "east",
            Facing::Southeast => "southeast",
            Facing::South => "south",
            Facing::Southwest => "southwest",
            Facing::West => "west",
            Facing::Northwest => "northwest",
        }
    }

    /// Sunset-relevant orientations.
    pub fn is_westerly(self) -> bool {
        matches!(self, Facing::West | Facing::Northwest | Facing::Southwest)
    }

    /// Sunrise-relevant orientations.
    pub fn is_easterly(self) -> bool {
        matches!(self, Facing::East | Facing::Northeast | Facing::Southeast)
    }
}

/// Water company whose discharge feed covers the beach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Company {
    WelshWater,
    SouthWestWater,
    SouthernWater,
    WessexWater,
}

impl Company {
    pub fn display_name(self) -> &'static str {
        match self {
            Company::WelshWater => "Welsh Water",
            Company::SouthWestWater => "South West Water",
            Company::SouthernWater => "Southern Water",
            Company::WessexWater => "Wessex Water",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Company::WelshWater => "welsh-water",
            Company::SouthWestWater => "south-west-water",
            Company::SouthernWater => "southern-water",
            Company::WessexWater => "wessex-water",
        }
    }
}

/// How often a beach sees storm-overflow discharges. Governs how long after
/// a discharge stops the water is deemed clear again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DischargeContext {
    Frequent,
    Moderate,
    Rare,
}

impl DischargeContext {
    pub fn clearance_hours(self) -> i64 {
        match self {
            DischargeContext::Frequent => 24,
            DischargeContext::Moderate => 36,
            DischargeContext::Rare => 48,
        }
    }

    /// Calmer wording used once the discharge is more than a day old.
    pub fn green_message(self) -> &'static str {
        match self {
            DischargeContext::Frequent => {
                "discharge yesterday. urban beach with UV treatment and regular testing - water quality rated excellent"
            }
            DischargeContext::Moderate => "discharge clearing. popular beach with monitoring",
            DischargeContext::Rare => {
                "discharge 24-48 hours ago. being cautious as this beach rarely has overflows"
            }
        }
    }

    /// Wording used while the discharge is under a day old.
    pub fn amber_message(self) -> &'static str {
        match self {
            DischargeContext::Frequent => {
                "discharge earlier today. water clearing. this beach has frequent overflows but good treatment systems"
            }
            DischargeContext::Moderate => "recent discharge. check again in a few hours if concerned",
            DischargeContext::Rare => {
                "unusual discharge for this remote beach. recommend waiting 48 hours"
            }
        }
    }
}

/// One beach. The table is compiled in and never mutated at runtime.
#[derive(Debug, Clone, Copy)]
pub struct Location {
    pub slug: &'static str,
    pub name: &'static str,
    pub area: &'static str,
    pub region: &'static str,
    pub lat: f64,
    pub lon: f64,
    pub facing: Facing,
    pub station_id: &'static str,
    pub company: Company,
    pub context: DischargeContext,
}

use Company::*;
use DischargeContext::*;
use Facing::*;

macro_rules! beach {
    ($slug:literal, $name:literal, $area:literal, $region:literal, $lat:literal, $lon:literal, $facing:expr, $station:literal, $company:expr, $context:expr) => {
        Location {
            slug: $slug,
            name: $name,
            area: $area,
            region: $region,
            lat: $lat,
            lon: $lon,
            facing: $facing,
            station_id: $station,
            company: $company,
            context: $context,
        }
    };
}

pub static BEACHES: &[Location] = &[
    // Anglesey
    beach!("benllech", "Benllech", "Anglesey", "wales", 53.319, -4.225, East, "0476A", WelshWater, Moderate),
    beach!("lligwy", "Lligwy Bay", "Anglesey", "wales", 53.341, -4.241, Northeast, "0476A", WelshWater, Rare),
    beach!("trearddur-bay", "Trearddur Bay", "Anglesey", "wales", 53.267, -4.617, Southwest, "0479", WelshWater, Moderate),
    beach!("rhosneigr", "Rhosneigr", "Anglesey", "wales", 53.228, -4.508, Southwest, "0479A", WelshWater, Moderate),
    beach!("newborough", "Newborough Beach", "Anglesey", "wales", 53.142, -4.378, Southwest, "0480", WelshWater, Rare),
    beach!("cemaes", "Cemaes Bay", "Anglesey", "wales", 53.414, -4.448, North, "0477A", WelshWater, Moderate),
    // Llyn Peninsula
    beach!("nefyn", "Nefyn", "Llyn Peninsula", "wales", 52.939, -4.524, North, "0481", WelshWater, Moderate),
    beach!("porth-oer", "Porth Oer (Whistling Sands)", "Llyn Peninsula", "wales", 52.878, -4.681, Northwest, "0481A", WelshWater, Rare),
    beach!("aberdaron", "Aberdaron", "Llyn Peninsula", "wales", 52.804, -4.713, Southwest, "0482A", WelshWater, Rare),
    beach!("abersoch", "Abersoch", "Llyn Peninsula", "wales", 52.822, -4.498, South, "0482B", WelshWater, Moderate),
    beach!("criccieth", "Criccieth", "Llyn Peninsula", "wales", 52.918, -4.232, South, "0483A", WelshWater, Moderate),
    // Cardigan Bay
    beach!("harlech", "Harlech Beach", "Gwynedd", "wales", 52.858, -4.109, West, "0484", WelshWater, Rare),
    beach!("barmouth", "Barmouth", "Gwynedd", "wales", 52.722, -4.055, West, "0485", WelshWater, Moderate),
    beach!("aberdovey", "Aberdovey", "Gwynedd", "wales", 52.544, -4.057, West, "0486", WelshWater, Moderate),
    beach!("aberystwyth", "Aberystwyth", "Ceredigion", "wales", 52.416, -4.085, West, "0487", WelshWater, Moderate),
    // Pembrokeshire
    beach!("newgale", "Newgale", "Pembrokeshire", "wales", 51.838, -5.118, West, "0492B", WelshWater, Moderate),
    beach!("broad-haven-north", "Broad Haven", "Pembrokeshire", "wales", 51.781, -5.108, West, "0492B", WelshWater, Moderate),
    beach!("marloes", "Marloes Sands", "Pembrokeshire", "wales", 51.730, -5.221, Southwest, "0493", WelshWater, Rare),
    beach!("freshwater-west", "Freshwater West", "Pembrokeshire", "wales", 51.653, -5.065, West, "0495", WelshWater, Rare),
    beach!("barafundle", "Barafundle Bay", "Pembrokeshire", "wales", 51.627, -4.917, South, "0501", WelshWater, Rare),
    beach!("manorbier", "Manorbier", "Pembrokeshire", "wales", 51.640, -4.799, South, "0502", WelshWater, Moderate),
    beach!("tenby-south", "Tenby South Beach", "Pembrokeshire", "wales", 51.667, -4.702, South, "0502", WelshWater, Moderate),
    beach!("tenby-north", "Tenby North Beach", "Pembrokeshire", "wales", 51.675, -4.696, East, "0502", WelshWater, Moderate),
    beach!("saundersfoot", "Saundersfoot", "Pembrokeshire", "wales", 51.709, -4.696, East, "0502", WelshWater, Moderate),
    beach!("amroth", "Amroth", "Pembrokeshire", "wales", 51.732, -4.651, South, "0502", WelshWater, Moderate),
    // Gower and south Wales
    beach!("rhossili", "Rhossili", "Gower Peninsula", "wales", 51.568, -4.291, West, "0505", WelshWater, Rare),
    beach!("llangennith", "Llangennith", "Gower Peninsula", "wales", 51.594, -4.295, West, "0505", WelshWater, Rare),
    beach!("oxwich", "Oxwich Bay", "Gower Peninsula", "wales", 51.552, -4.150, South, "0508", WelshWater, Rare),
    beach!("three-cliffs", "Three Cliffs Bay", "Gower Peninsula", "wales", 51.565, -4.110, South, "0508", WelshWater, Rare),
    beach!("caswell", "Caswell Bay", "Gower Peninsula", "wales", 51.570, -4.030, South, "0508", WelshWater, Moderate),
    beach!("langland", "Langland Bay", "Gower Peninsula", "wales", 51.568, -4.009, South, "0508", WelshWater, Moderate),
    beach!("swansea", "Swansea Bay", "Swansea", "wales", 51.617, -3.968, South, "0509", WelshWater, Frequent),
    beach!("porthcawl", "Porthcawl (Coney Beach)", "Bridgend", "wales", 51.478, -3.691, South, "0512", WelshWater, Frequent),
    beach!("barry-island", "Barry Island", "Vale of Glamorgan", "wales", 51.390, -3.273, South, "0513", WelshWater, Frequent),
    // Cornwall
    beach!("sennen", "Sennen Cove", "Cornwall", "england", 50.071, -5.697, West, "0548", SouthWestWater, Rare),
    beach!("porthcurno", "Porthcurno", "Cornwall", "england", 50.043, -5.655, South, "0002", SouthWestWater, Rare),
    beach!("penzance", "Penzance", "Cornwall", "england", 50.116, -5.533, South, "0002", SouthWestWater, Moderate),
    beach!("kynance", "Kynance Cove", "Cornwall", "england", 49.975, -5.232, West, "0003", SouthWestWater, Rare),
    beach!("falmouth-gyllyngvase", "Gyllyngvase Beach", "Cornwall", "england", 50.143, -5.070, South, "0005", SouthWestWater, Moderate),
    beach!("mevagissey", "Mevagissey", "Cornwall", "england", 50.269, -4.787, Southeast, "0007", SouthWestWater, Moderate),
    // Dorset
    beach!("lyme-regis", "Lyme Regis", "Dorset", "england", 50.720, -2.938, South, "0028", WessexWater, Moderate),
    beach!("west-bay", "West Bay", "Dorset", "england", 50.710, -2.762, South, "0029", WessexWater, Moderate),
    beach!("weymouth", "Weymouth", "Dorset", "england", 50.608, -2.454, South, "0033", WessexWater, Frequent),
    beach!("lulworth-cove", "Lulworth Cove", "Dorset", "england", 50.619, -2.249, South, "0034", WessexWater, Rare),
    beach!("swanage", "Swanage", "Dorset", "england", 50.610, -1.953, East, "0035", WessexWater, Moderate),
    // South coast
    beach!("milford-on-sea", "Milford on Sea", "Hampshire", "england", 50.722, -1.593, South, "0039", SouthernWater, Moderate),
    beach!("ventnor", "Ventnor", "Isle of Wight", "england", 50.593, -1.202, South, "0051", SouthernWater, Moderate),
    beach!("shanklin", "Shanklin", "Isle of Wight", "england", 50.631, -1.178, East, "0053", SouthernWater, Moderate),
    beach!("sandown", "Sandown", "Isle of Wight", "england", 50.654, -1.152, East, "0053", SouthernWater, Moderate),
    beach!("west-wittering", "West Wittering", "West Sussex", "england", 50.772, -0.885, South, "0068", SouthernWater, Moderate),
    beach!("bognor-regis", "Bognor Regis", "West Sussex", "england", 50.781, -0.677, South, "0073", SouthernWater, Frequent),
];

pub fn find(slug: &str) -> Option<&'static Location> {
    BEACHES.iter().find(|b| b.slug == slug)
}

pub fn all() -> &'static [Location] {
    BEACHES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_known_slug() {
        let beach = find("barry-island").unwrap();
        assert_eq!(beach.name, "Barry Island");
        assert_eq!(beach.company, Company::WelshWater);
        assert_eq!(beach.context, DischargeContext::Frequent);
    }

    #[test]
    fn test_find_unknown_slug() {
        assert!(find("not-a-real-beach").is_none());
    }

    #[test]
    fn test_slugs_are_unique() {
        let mut slugs: Vec<_> = BEACHES.iter().map(|b| b.slug).collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), BEACHES.len());
    }

    #[test]
    fn test_facing_groups() {
        assert!(Facing::Northwest.is_westerly());
        assert!(Facing::Southwest.is_westerly());
        assert!(!Facing::South.is_westerly());
        assert!(Facing::Northeast.is_easterly());
        assert!(!Facing::West.is_easterly());
    }

    #[test]
    fn test_clearance_windows() {
        assert_eq!(DischargeContext::Frequent.clearance_hours(), 24);
        assert_eq!(DischargeContext::Moderate.clearance_hours(), 36);
        assert_eq!(DischargeContext::Rare.clearance_hours(), 48);
    }
}
