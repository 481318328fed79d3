use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GradeLevel {
    #[default]
    Kindergarten,
    Grade1,
    Grade2,
    Grade3,
    Grade4,
    Grade5,
    Grade6,
    Grade7,
    Grade8,
    Algebra1,
    Geometry,
    Algebra2,
}

impl GradeLevel {
    /// Every option, in the order the selector shows them.
    pub const ALL: [GradeLevel; 12] = [
        GradeLevel::Kindergarten,
        GradeLevel::Grade1,
        GradeLevel::Grade2,
        GradeLevel::Grade3,
        GradeLevel::Grade4,
        GradeLevel::Grade5,
        GradeLevel::Grade6,
        GradeLevel::Grade7,
        GradeLevel::Grade8,
        GradeLevel::Algebra1,
        GradeLevel::Geometry,
        GradeLevel::Algebra2,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            GradeLevel::Kindergarten => "Kindergarten",
            GradeLevel::Grade1 => "Grade 1",
            GradeLevel::Grade2 => "Grade 2",
            GradeLevel::Grade3 => "Grade 3",
            GradeLevel::Grade4 => "Grade 4",
            GradeLevel::Grade5 => "Grade 5",
            GradeLevel::Grade6 => "Grade 6",
            GradeLevel::Grade7 => "Grade 7",
            GradeLevel::Grade8 => "Grade 8",
            GradeLevel::Algebra1 => "Algebra 1",
            GradeLevel::Geometry => "Geometry",
            GradeLevel::Algebra2 => "Algebra 2",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|grade| grade == self)
            .unwrap_or_default()
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(GradeLevel::label).collect()
    }
}

impl fmt::Display for GradeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GradeLevel {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let normalized = value.split_whitespace().collect::<Vec<_>>().join(" ");

        if normalized.eq_ignore_ascii_case("k") {
            return Ok(GradeLevel::Kindergarten);
        }

        // Bare numbers refer to the numbered grades
        if let Ok(number) = normalized.parse::<usize>()
            && (1..=8).contains(&number)
        {
            return Ok(Self::ALL[number]);
        }

        Self::ALL
            .iter()
            .find(|grade| grade.label().eq_ignore_ascii_case(&normalized))
            .copied()
            .ok_or_else(|| {
                anyhow!(
                    "Unknown grade level '{}'. Choose one of: {}",
                    value.trim(),
                    Self::labels().join(", ")
                )
            })
    }
}
