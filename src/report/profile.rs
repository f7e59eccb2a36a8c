use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Targets;

const MIN_CALORIES: f64 = 1200.0;
const CALORIE_SPREAD: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Sedentary => 1.2,
            Self::Light => 1.375,
            Self::Moderate => 1.55,
            Self::Active => 1.725,
            Self::VeryActive => 1.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Lose,
    Maintain,
    Gain,
}

impl Goal {
    fn calorie_adjustment(self) -> f64 {
        match self {
            Self::Lose => -500.0,
            Self::Maintain => 0.0,
            Self::Gain => 300.0,
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown {kind}: {value}")]
pub struct ProfileParseError {
    kind: &'static str,
    value: String,
}

fn normalized(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace('-', "_")
}

impl FromStr for Gender {
    type Err = ProfileParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalized(s).as_str() {
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            _ => Err(ProfileParseError {
                kind: "gender",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = ProfileParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalized(s).as_str() {
            "sedentary" => Ok(Self::Sedentary),
            "light" => Ok(Self::Light),
            "moderate" => Ok(Self::Moderate),
            "active" => Ok(Self::Active),
            "very_active" => Ok(Self::VeryActive),
            _ => Err(ProfileParseError {
                kind: "activity level",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for Goal {
    type Err = ProfileParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalized(s).as_str() {
            "lose" => Ok(Self::Lose),
            "maintain" => Ok(Self::Maintain),
            "gain" => Ok(Self::Gain),
            _ => Err(ProfileParseError {
                kind: "goal",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Underweight => "Underweight",
            Self::Normal => "Normal",
            Self::Overweight => "Overweight",
            Self::Obese => "Obese",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: u32,
    #[serde(default = "default_gender")]
    pub gender: Gender,
    #[serde(default = "default_activity")]
    pub activity: ActivityLevel,
    #[serde(default = "default_goal")]
    pub goal: Goal,
}

fn default_gender() -> Gender {
    Gender::Male
}

fn default_activity() -> ActivityLevel {
    ActivityLevel::Moderate
}

fn default_goal() -> Goal {
    Goal::Maintain
}

#[derive(Debug, Error, PartialEq)]
#[error("{field} must be a positive number, got {value}")]
pub struct InvalidProfile {
    pub field: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    fn midpoint(self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation {
    pub bmr: f64,
    pub tdee: f64,
    pub calories: Range,
    pub protein: Range,
    pub carbs: Range,
    pub fat: Range,
}

impl Recommendation {
    // Targets are points, so each range collapses to its midpoint.
    pub fn targets(&self) -> Targets {
        Targets {
            calories: self.calories.midpoint(),
            protein: self.protein.midpoint(),
            carbs: self.carbs.midpoint(),
            fat: self.fat.midpoint(),
        }
    }
}

impl Profile {
    pub fn validate(&self) -> Result<(), InvalidProfile> {
        for (field, value) in [("weight", self.weight_kg), ("height", self.height_cm)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(InvalidProfile { field, value });
            }
        }
        Ok(())
    }

    pub fn bmi(&self) -> (f64, BmiCategory) {
        let height_m = self.height_cm / 100.0;
        let bmi = self.weight_kg / (height_m * height_m);
        let category = if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        };
        ((bmi * 10.0).round_ties_even() / 10.0, category)
    }

    // Mifflin-St Jeor.
    pub fn bmr(&self) -> f64 {
        let base = 10.0 * self.weight_kg + 6.25 * self.height_cm - 5.0 * f64::from(self.age);
        let offset = match self.gender {
            Gender::Male => 5.0,
            Gender::Female => -161.0,
        };
        (base + offset).round_ties_even()
    }

    pub fn tdee(&self) -> f64 {
        (self.bmr() * self.activity.multiplier()).round_ties_even()
    }

    pub fn recommend(&self) -> Recommendation {
        let bmr = self.bmr();
        let tdee = self.tdee();
        let calories = (tdee + self.goal.calorie_adjustment()).max(MIN_CALORIES);
        let share = |fraction: f64, per_gram: f64| (calories * fraction / per_gram).round_ties_even();
        Recommendation {
            bmr,
            tdee,
            calories: Range {
                min: calories - CALORIE_SPREAD,
                max: calories + CALORIE_SPREAD,
            },
            protein: Range {
                min: (self.weight_kg * 1.6).round_ties_even(),
                max: (self.weight_kg * 2.2).round_ties_even(),
            },
            carbs: Range {
                min: share(0.40, 4.0),
                max: share(0.55, 4.0),
            },
            fat: Range {
                min: share(0.20, 9.0),
                max: share(0.35, 9.0),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile {
            weight_kg: 70.0,
            height_cm: 170.0,
            age: 25,
            gender: Gender::Male,
            activity: ActivityLevel::Moderate,
            goal: Goal::Maintain,
        }
    }

    #[test]
    fn bmi_is_rounded_to_one_decimal() {
        assert_eq!(profile().bmi(), (24.2, BmiCategory::Normal));
        let heavy = Profile {
            weight_kg: 95.0,
            ..profile()
        };
        assert_eq!(heavy.bmi().1, BmiCategory::Obese);
    }

    #[test]
    fn maintenance_targets_follow_energy_expenditure() {
        let rec = profile().recommend();
        assert_eq!(rec.bmr, 1642.0);
        assert_eq!(rec.tdee, 2545.0);
        assert_eq!(rec.calories, Range { min: 2345.0, max: 2745.0 });
        assert_eq!(rec.protein, Range { min: 112.0, max: 154.0 });
        assert_eq!(rec.fat, Range { min: 57.0, max: 99.0 });

        let targets = rec.targets();
        assert_eq!(targets.calories, 2545.0);
        assert_eq!(targets.protein, 133.0);
        assert_eq!(targets.fat, 78.0);
        assert!(targets.carbs > rec.carbs.min && targets.carbs < rec.carbs.max);
    }

    #[test]
    fn calorie_floor_applies_to_aggressive_cuts() {
        let small = Profile {
            weight_kg: 60.0,
            height_cm: 165.0,
            age: 30,
            gender: Gender::Female,
            activity: ActivityLevel::Sedentary,
            goal: Goal::Lose,
        };
        let rec = small.recommend();
        assert_eq!(rec.bmr, 1320.0);
        assert_eq!(rec.tdee, 1584.0);
        assert_eq!(rec.targets().calories, 1200.0);
    }

    #[test]
    fn parses_profile_words() {
        assert_eq!(
            "Very-Active".parse::<ActivityLevel>().expect("activity"),
            ActivityLevel::VeryActive
        );
        assert_eq!("F".parse::<Gender>().expect("gender"), Gender::Female);
        assert!("bulk".parse::<Goal>().is_err());
    }

    #[test]
    fn rejects_non_positive_measurements() {
        let bad = Profile {
            height_cm: 0.0,
            ..profile()
        };
        assert_eq!(
            bad.validate(),
            Err(InvalidProfile {
                field: "height",
                value: 0.0
            })
        );
        assert!(profile().validate().is_ok());
    }
}
