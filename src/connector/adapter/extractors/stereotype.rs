use crate::application::ParseOutput;
use crate::domain::{best_stereotype, NodeKind, Stereotype, StereotypeScore};

const SUFFIX_SIGNALS: &[(&str, Stereotype)] = &[
    ("Controller", Stereotype::Controller),
    ("Resource", Stereotype::Controller),
    ("Service", Stereotype::Service),
    ("Repository", Stereotype::Repository),
    ("Dao", Stereotype::Repository),
    ("Entity", Stereotype::Entity),
    ("Dto", Stereotype::Dto),
    ("Request", Stereotype::Dto),
    ("Response", Stereotype::Dto),
    ("Config", Stereotype::Configuration),
    ("Configuration", Stereotype::Configuration),
    ("Utils", Stereotype::Utility),
    ("Util", Stereotype::Utility),
    ("Helper", Stereotype::Utility),
    ("Factory", Stereotype::Factory),
    ("Builder", Stereotype::Builder),
    ("Middleware", Stereotype::Middleware),
    ("Guard", Stereotype::Guard),
    ("Filter", Stereotype::Filter),
    ("Validator", Stereotype::Validator),
    ("Mapper", Stereotype::Mapper),
    ("Client", Stereotype::Client),
    ("Handler", Stereotype::Handler),
    ("Provider", Stereotype::Provider),
    ("Module", Stereotype::Module),
];

const ANNOTATION_SIGNALS: &[(&str, Stereotype)] = &[
    ("@RestController", Stereotype::Controller),
    ("@Controller", Stereotype::Controller),
    ("@Service", Stereotype::Service),
    ("@Repository", Stereotype::Repository),
    ("@Entity", Stereotype::Entity),
    ("@Configuration", Stereotype::Configuration),
    ("@Component", Stereotype::Module),
];

fn score_for(name: &str, content: &str) -> StereotypeScore {
    let mut candidates = Vec::new();

    for (suffix, stereotype) in SUFFIX_SIGNALS {
        if name.ends_with(suffix) {
            candidates.push(StereotypeScore {
                stereotype: *stereotype,
                score: 0.55,
                signals: vec![format!("naming:{suffix}")],
            });
        }
    }

    for (annotation, stereotype) in ANNOTATION_SIGNALS {
        if content.contains(annotation) {
            candidates.push(StereotypeScore {
                stereotype: *stereotype,
                score: 0.9,
                signals: vec![format!("annotation:{annotation}")],
            });
        }
    }

    best_stereotype(candidates)
}

/// Scores every `Class`/`Struct` node already emitted for this file across
/// naming and annotation signals and writes the best-scoring stereotype as
/// a node property when it clears the confidence threshold (§4.6).
pub fn annotate(content: &str, _repository_id: &str, output: &mut ParseOutput) {
    for node in output
        .nodes
        .iter_mut()
        .filter(|n| matches!(n.kind, NodeKind::Class | NodeKind::Struct))
    {
        let result = score_for(&node.name, content);
        if result.stereotype != Stereotype::Unknown {
            node.set_property("stereotype", result.stereotype.as_str());
            node.set_property("stereotypeConfidence", result.score);
        }
    }
}
