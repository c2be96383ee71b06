//! Skill price analysis: which listed skills go with higher salaries.

mod aggregate;
mod parser;

pub use aggregate::{SalaryMeasure, SkillPriceAggregator, SkillPriceTable, table_columns};
pub use parser::{SkillListError, normalize_skill, parse_skill_list};
