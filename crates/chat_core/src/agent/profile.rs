//! AgentId and AgentProfile - static persona descriptors
//!
//! Each persona is one variant of a closed enum mapped to an immutable
//! descriptor. The set is exhaustive by construction; adding a persona is a
//! compile-time change, never a runtime registration.

use serde::{Deserialize, Serialize};

/// Identifier for one of the four fixed agent personas.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AgentId {
    DisciplineHead,
    MethodsSpecialist,
    CorrosionEngineer,
    SubseaEngineer,
}

/// Immutable descriptor for a persona. Defined once at process start and
/// never mutated.
#[derive(Debug, Clone, Copy)]
pub struct AgentProfile {
    pub id: AgentId,
    pub display_name: &'static str,
    pub description: &'static str,
    pub capabilities: &'static [&'static str],
    pub system_instruction: &'static str,
    pub avatar: &'static str,
}

static DISCIPLINE_HEAD: AgentProfile = AgentProfile {
    id: AgentId::DisciplineHead,
    display_name: "Discipline Head",
    description: "Overall project coordination and decision making",
    capabilities: &[
        "project_oversight",
        "decision_making",
        "coordination",
        "risk_assessment",
        "compliance_review",
    ],
    system_instruction: "You are the Discipline Head for an offshore engineering team. \
        Advise on project scope and objectives, risk assessment and mitigation, \
        compliance with standards and regulations, key decision points, and resource \
        requirements. Be direct and flag anything that needs escalation.",
    avatar: "avatars/discipline_head.png",
};

static METHODS_SPECIALIST: AgentProfile = AgentProfile {
    id: AgentId::MethodsSpecialist,
    display_name: "Methods Specialist",
    description: "Engineering methods and procedures",
    capabilities: &[
        "method_analysis",
        "procedure_optimization",
        "best_practices",
        "workflow_analysis",
        "process_improvement",
    ],
    system_instruction: "You are a Methods Specialist for an offshore engineering team. \
        Advise on engineering methods and techniques, procedures and workflows, best \
        practices and applicable standards, process optimization opportunities, and \
        quality control measures.",
    avatar: "avatars/methods_specialist.png",
};

static CORROSION_ENGINEER: AgentProfile = AgentProfile {
    id: AgentId::CorrosionEngineer,
    display_name: "Corrosion Engineer",
    description: "Corrosion analysis and prevention",
    capabilities: &[
        "corrosion_analysis",
        "material_selection",
        "prevention_strategies",
        "inspection_methods",
        "cathodic_protection",
    ],
    system_instruction: "You are a Corrosion Engineer for an offshore engineering team. \
        Advise on corrosion mechanisms and types, material selection and properties, \
        environmental factors affecting corrosion, prevention and mitigation \
        strategies, and inspection and monitoring methods.",
    avatar: "avatars/corrosion_engineer.png",
};

static SUBSEA_ENGINEER: AgentProfile = AgentProfile {
    id: AgentId::SubseaEngineer,
    display_name: "Subsea Engineer",
    description: "Subsea systems and operations",
    capabilities: &[
        "subsea_systems",
        "underwater_operations",
        "marine_engineering",
        "riser_systems",
        "flowline_analysis",
    ],
    system_instruction: "You are a Subsea Engineer for an offshore engineering team. \
        Advise on subsea systems and components, riser and flowline systems, marine \
        environment considerations, installation and operations, and safety and \
        reliability aspects.",
    avatar: "avatars/subsea_engineer.png",
};

impl AgentId {
    /// All personas in fixed display order.
    pub const ALL: [AgentId; 4] = [
        AgentId::DisciplineHead,
        AgentId::MethodsSpecialist,
        AgentId::CorrosionEngineer,
        AgentId::SubseaEngineer,
    ];

    /// The static descriptor for this persona.
    pub fn profile(self) -> &'static AgentProfile {
        match self {
            AgentId::DisciplineHead => &DISCIPLINE_HEAD,
            AgentId::MethodsSpecialist => &METHODS_SPECIALIST,
            AgentId::CorrosionEngineer => &CORROSION_ENGINEER,
            AgentId::SubseaEngineer => &SUBSEA_ENGINEER,
        }
    }

    /// Stable snake_case key, used in storage keys and serialized session
    /// metadata.
    pub fn role_key(self) -> &'static str {
        match self {
            AgentId::DisciplineHead => "discipline_head",
            AgentId::MethodsSpecialist => "methods_specialist",
            AgentId::CorrosionEngineer => "corrosion_engineer",
            AgentId::SubseaEngineer => "subsea_engineer",
        }
    }

    /// Parse a `role_key` back into an id.
    pub fn from_role_key(key: &str) -> Option<AgentId> {
        AgentId::ALL.into_iter().find(|id| id.role_key() == key)
    }

    /// The opening assistant message for a fresh conversation. Pure function
    /// of the user's display name.
    pub fn welcome_message(self, user_name: &str) -> String {
        match self {
            AgentId::DisciplineHead => format!(
                "Hello {user_name}, I'm your Discipline Head. I can help with project \
                 coordination, risk assessment, and compliance decisions. What are we \
                 looking at today?"
            ),
            AgentId::MethodsSpecialist => format!(
                "Hi {user_name}, Methods Specialist here. Ask me about engineering \
                 procedures, workflows, and process optimization."
            ),
            AgentId::CorrosionEngineer => format!(
                "Hello {user_name}, I'm your Corrosion Engineer. I can assess corrosion \
                 mechanisms, material selection, and prevention strategies."
            ),
            AgentId::SubseaEngineer => format!(
                "Hi {user_name}, Subsea Engineer speaking. Bring me anything on subsea \
                 systems, risers, flowlines, or marine operations."
            ),
        }
    }
}
