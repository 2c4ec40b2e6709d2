use chrono::NaiveDate;

/// Percent of salary attributed to each impact point.
const SALARY_PERCENT_PER_POINT: f64 = 0.2;

/// Multiplier applied once the certification's expiration date has passed.
const EXPIRED_MULTIPLIER: f64 = 0.5;

fn category_score(category: &str) -> f64 {
    match category {
        "Technical" => 25.0,
        "Management" => 20.0,
        "Leadership" => 18.0,
        "Industry Specific" => 15.0,
        "Language" => 10.0,
        _ => 5.0,
    }
}

fn skill_multiplier(skill_level: &str) -> f64 {
    match skill_level {
        "Expert" => 1.0,
        "Advanced" => 0.8,
        "Intermediate" => 0.6,
        _ => 0.4,
    }
}

/// Impact score (0-100) and estimated salary effect in percent.
///
/// `category score x skill multiplier`, halved once expired, rounded to the
/// nearest integer; each impact point is worth 0.2% of salary.
pub fn impact(
    category: &str,
    skill_level: &str,
    expiration_date: Option<NaiveDate>,
    today: NaiveDate,
) -> (i32, f64) {
    let validity = match expiration_date {
        Some(expires) if expires <= today => EXPIRED_MULTIPLIER,
        _ => 1.0,
    };
    let score = (category_score(category) * skill_multiplier(skill_level) * validity).round();
    (score as i32, score * SALARY_PERCENT_PER_POINT)
}
