//! Canned dataset payloads.

pub const BANDS_CSV: &str = "name,rank,imageUrl\n\
                             Slayer,Must,http://img/slayer.jpg\n\
                             Tool,Might,\n\
                             Ghost,,\n";

pub const SCHEDULE_CSV: &str = "band,location,day,startTime,endTime,type\n\
                                Slayer,Main Stage,2026-01-29,17:30,18:30,Show\n\
                                Slayer,Lounge,2026-01-30,11:00,12:00,Meet and Greet\n\
                                Tool,Main Stage,2026-01-29,20:00,21:30,Show\n";

pub const DESCRIPTIONS_CSV: &str = "Band,Description\n\
                                    Slayer,http://x/slayer.txt\n\
                                    Tool,Prog metal veterans.\n";

/// Pointer manifest naming all three dataset routes on `base`.
pub fn pointer_manifest(base: &str) -> String {
    format!(
        "bandList={base}/bands.csv\n\
         schedule={base}/schedule.csv\n\
         descriptionMap={base}/descriptions.csv\n"
    )
}

/// Pointer manifest with no schedule entry, for default-URL fallback tests.
pub fn pointer_manifest_without_schedule(base: &str) -> String {
    format!(
        "bandList={base}/bands.csv\n\
         descriptionMap={base}/descriptions.csv\n"
    )
}
