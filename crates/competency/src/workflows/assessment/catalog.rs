use super::domain::{CategoryId, SkillCategory};

struct CategorySeed {
    key: &'static str,
    name: &'static str,
    description: &'static str,
}

const STANDARD_CATEGORIES: [CategorySeed; 10] = [
    CategorySeed {
        key: "strategic_thinking",
        name: "Strategic Thinking",
        description: "Ability to think long-term and see the big picture",
    },
    CategorySeed {
        key: "business_acumen",
        name: "Business Acumen",
        description: "Understanding of business principles and market dynamics",
    },
    CategorySeed {
        key: "product_management",
        name: "Product Management",
        description: "Skills in product strategy, roadmapping, and execution",
    },
    CategorySeed {
        key: "data_analysis",
        name: "Data Analysis",
        description: "Ability to interpret data and make data-driven decisions",
    },
    CategorySeed {
        key: "user_research",
        name: "User Research",
        description: "Skills in understanding user needs and conducting research",
    },
    CategorySeed {
        key: "communication",
        name: "Communication",
        description: "Effective written and verbal communication skills",
    },
    CategorySeed {
        key: "leadership",
        name: "Leadership",
        description: "Ability to lead teams and influence outcomes",
    },
    CategorySeed {
        key: "technical_skills",
        name: "Technical Skills",
        description: "Understanding of technical concepts and tools",
    },
    CategorySeed {
        key: "project_management",
        name: "Project Management",
        description: "Skills in planning, executing, and delivering projects",
    },
    CategorySeed {
        key: "innovation",
        name: "Innovation",
        description: "Ability to generate new ideas and drive innovation",
    },
];

/// Reference set of skill categories used to seed a new workspace.
#[derive(Debug, Clone)]
pub struct SkillCatalog {
    categories: Vec<SkillCategory>,
}

impl SkillCatalog {
    pub fn standard() -> Self {
        let categories = STANDARD_CATEGORIES
            .iter()
            .zip(1..)
            .map(|(seed, sort_order)| SkillCategory {
                id: CategoryId(seed.key.to_string()),
                name: seed.name.to_string(),
                description: seed.description.to_string(),
                sort_order,
            })
            .collect();

        Self { categories }
    }

    pub fn categories(&self) -> &[SkillCategory] {
        &self.categories
    }

    pub fn into_categories(self) -> Vec<SkillCategory> {
        self.categories
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_is_ordered_and_unique() {
        let catalog = SkillCatalog::standard();
        let categories = catalog.categories();
        assert_eq!(categories.len(), 10);
        assert_eq!(categories[0].name, "Strategic Thinking");
        assert_eq!(categories[9].name, "Innovation");
        assert!(categories
            .windows(2)
            .all(|pair| pair[0].sort_order < pair[1].sort_order));

        let mut ids: Vec<&str> = categories.iter().map(|c| c.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }
}
