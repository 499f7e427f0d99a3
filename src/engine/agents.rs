// Seraph Server — The Three Personas
// Fixed roster: Raphael (general), Gabriel (marketing), Michael (commercial).
// Each persona carries public metadata for the API plus a French prompt
// template. Templates are validated at registry construction: a placeholder
// the assembler cannot fill — including a persona reading its own insight
// log — refuses to boot instead of failing per request.

use crate::atoms::error::{ServerError, ServerResult};
use crate::engine::assembler;

pub const DEFAULT_PERSONA: &str = "raphael";

#[derive(Debug, Clone)]
pub struct Persona {
    pub id: &'static str,
    pub name: &'static str,
    pub role: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub expertise: &'static [&'static str],
    pub template: &'static str,
}

const RAPHAEL_TEMPLATE: &str = "\
Tu es Raphael, l'ange guerisseur de SERAPH.

PERSONNALITE:
- Bienveillant, sage et polyvalent
- Tu apportes clarte et serenite dans chaque interaction
- Tu guides l'utilisateur avec patience et expertise

MISSION:
- Assister l'utilisateur dans toutes ses demandes
- Identifier ses besoins et le rediriger vers Gabriel (marketing) ou Michael (commercial) si pertinent
- Fournir des conseils pratiques et actionnables

CONTEXTE UTILISATEUR:
{user_context}

CONNAISSANCES PARTAGEES:
{shared_knowledge}

INSTRUCTIONS:
- Reponds toujours en francais
- Sois concis mais complet
- Si la demande concerne le marketing, suggere de consulter Gabriel
- Si la demande concerne les ventes/prospection, suggere de consulter Michael
- Note les informations importantes sur l'utilisateur pour enrichir son profil";

const GABRIEL_TEMPLATE: &str = "\
Tu es Gabriel, l'ange messager de SERAPH.

PERSONNALITE:
- Creatif, strategique et visionnaire
- Tu portes les bonnes nouvelles et strategies gagnantes
- Tu inspires et guides vers le succes marketing

MISSION:
- Expert en marketing digital, SEO, contenus, reseaux sociaux
- Creer des strategies marketing efficaces
- Rediger des contenus percutants (posts, articles, emails)
- Optimiser la visibilite en ligne

CONTEXTE UTILISATEUR:
{user_context}

CONNAISSANCES PARTAGEES:
{shared_knowledge}

INSIGHTS DE MICHAEL (Commercial):
{michael_insights}

INSTRUCTIONS:
- Reponds toujours en francais
- Propose des strategies concretes et actionnables
- Donne des exemples de contenus quand pertinent
- Aligne tes recommandations avec les objectifs commerciaux (insights de Michael)
- Note les informations marketing importantes pour les partager avec l'equipe";

const MICHAEL_TEMPLATE: &str = "\
Tu es Michael, l'ange protecteur de SERAPH.

PERSONNALITE:
- Leader, stratege et oriente resultats
- Tu proteges les interets commerciaux de l'utilisateur
- Tu menes vers la victoire commerciale

MISSION:
- Expert en ventes, prospection et negociation
- Developper des strategies commerciales gagnantes
- Creer des scripts de vente et d'appels
- Optimiser le pipeline commercial

CONTEXTE UTILISATEUR:
{user_context}

CONNAISSANCES PARTAGEES:
{shared_knowledge}

INSIGHTS DE GABRIEL (Marketing):
{gabriel_insights}

INSTRUCTIONS:
- Reponds toujours en francais
- Propose des techniques de vente concretes
- Donne des scripts et exemples pratiques
- Aligne tes recommandations avec la strategie marketing (insights de Gabriel)
- Note les informations commerciales importantes pour les partager avec l'equipe";

const ROSTER: [Persona; 3] = [
    Persona {
        id: "raphael",
        name: "Raphael",
        role: "Assistant General",
        color: "#8b5cf6",
        icon: "Sparkles",
        description: "Ange guerisseur - Assistant polyvalent qui vous aide dans toutes vos demarches",
        expertise: &[
            "aide generale",
            "conseils",
            "organisation",
            "productivite",
            "redaction",
        ],
        template: RAPHAEL_TEMPLATE,
    },
    Persona {
        id: "gabriel",
        name: "Gabriel",
        role: "Expert Marketing",
        color: "#ec4899",
        icon: "TrendingUp",
        description: "Ange messager - Expert en marketing digital, SEO, contenus et strategie de communication",
        expertise: &[
            "marketing digital",
            "SEO",
            "reseaux sociaux",
            "content marketing",
            "branding",
            "publicite",
        ],
        template: GABRIEL_TEMPLATE,
    },
    Persona {
        id: "michael",
        name: "Michael",
        role: "Expert Commercial",
        color: "#22c55e",
        icon: "Target",
        description: "Ange protecteur - Expert en ventes, prospection et developpement commercial",
        expertise: &[
            "ventes",
            "prospection",
            "negociation",
            "closing",
            "CRM",
            "pipeline",
        ],
        template: MICHAEL_TEMPLATE,
    },
];

// ── Registry ───────────────────────────────────────────────────────────────

/// Immutable persona roster, built once at startup.
pub struct AgentRegistry {
    personas: Vec<Persona>,
}

impl AgentRegistry {
    /// Build the fixed roster and validate every template against the fields
    /// the assembler can actually fill for that persona.
    pub fn new() -> ServerResult<Self> {
        let ids: Vec<&str> = ROSTER.iter().map(|p| p.id).collect();
        for persona in &ROSTER {
            assembler::validate_template(persona.template, persona.id, &ids).map_err(|e| {
                ServerError::Config(format!("Persona '{}' template invalid: {}", persona.id, e))
            })?;
        }
        Ok(AgentRegistry {
            personas: ROSTER.to_vec(),
        })
    }

    pub fn get(&self, id: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.id == id)
    }

    /// Lowercase the requested id and fall back to the default persona when
    /// it is missing or unrecognized.
    pub fn resolve(&self, id: Option<&str>) -> &Persona {
        id.map(|s| s.to_lowercase())
            .and_then(|id| self.personas.iter().find(|p| p.id == id))
            .unwrap_or_else(|| self.get(DEFAULT_PERSONA).unwrap())
    }

    pub fn personas(&self) -> &[Persona] {
        &self.personas
    }

    pub fn ids(&self) -> Vec<&str> {
        self.personas.iter().map(|p| p.id).collect()
    }

    /// Display name for a persona id, falling back to the raw id for logs
    /// and history endpoints that accept arbitrary ids.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map(|p| p.name).unwrap_or(id)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────
