//! 配对弹窗文案选择
//!
//! `(connection_type, data, role) -> Presentation` 的纯函数，未知类型回退到通用的
//! "New Connection" 文案。

use crate::social::connection::models::{
    ConnectionData, ConnectionType, Cta, CtaAction, Presentation, UserRole,
};

fn cta(label: &str, action: CtaAction) -> Cta {
    Cta {
        label: label.to_string(),
        action,
    }
}

fn display_name(data: &ConnectionData) -> &str {
    let name = data.partner_name.trim();
    if name.is_empty() {
        "your new connection"
    } else {
        name
    }
}

fn money(amount: Option<f64>) -> Option<String> {
    amount.filter(|a| *a > 0.0).map(|a| format!("${:.2}", a))
}

pub fn present(
    connection_type: &ConnectionType,
    data: &ConnectionData,
    role: UserRole,
) -> Presentation {
    let name = display_name(data);

    match connection_type {
        ConnectionType::InstantConnection => Presentation {
            title: "It's a Connection!".to_string(),
            subtitle: format!("You and {} are now connected", name),
            description: match role {
                UserRole::Member => format!("Start a conversation and get to know {}.", name),
                UserRole::Creator => format!("{} is interested in your content. Say hi!", name),
            },
            icon: "💞".to_string(),
            primary_cta: cta("Send a Message", CtaAction::OpenChat),
            secondary_cta: Some(cta("Keep Swiping", CtaAction::KeepSwiping)),
        },
        ConnectionType::MutualInterest => Presentation {
            title: "It's a Match!".to_string(),
            subtitle: format!("You and {} liked each other", name),
            description: "Mutual interest is the best start. Don't keep them waiting."
                .to_string(),
            icon: "💘".to_string(),
            primary_cta: cta("Send a Message", CtaAction::OpenChat),
            secondary_cta: Some(cta("View Profile", CtaAction::ViewProfile)),
        },
        ConnectionType::SuperLikeMatch => Presentation {
            title: "Super Like Match!".to_string(),
            subtitle: format!("{} noticed your Super Like", name),
            description: "Super Likes stand out. Follow up while the spark is fresh.".to_string(),
            icon: "⭐".to_string(),
            primary_cta: cta("Send a Message", CtaAction::OpenChat),
            secondary_cta: Some(cta("View Profile", CtaAction::ViewProfile)),
        },
        ConnectionType::HighValueConnection => match role {
            UserRole::Creator => Presentation {
                title: "High-Value Fan!".to_string(),
                subtitle: format!("{} just connected with you", name),
                description: match (money(data.monthly_spend), money(data.total_spent)) {
                    (Some(monthly), _) => format!(
                        "{} has spent {} on creators this month. Send a personal welcome.",
                        name, monthly
                    ),
                    (None, Some(total)) => format!(
                        "{} has spent {} on creators so far. Send a personal welcome.",
                        name, total
                    ),
                    (None, None) => {
                        format!("{} is one of the most active fans. Send a personal welcome.", name)
                    }
                },
                icon: "💎".to_string(),
                primary_cta: cta("Send Welcome Message", CtaAction::OpenChat),
                secondary_cta: Some(cta("View Fan Profile", CtaAction::ViewProfile)),
            },
            UserRole::Member => Presentation {
                title: "VIP Connection!".to_string(),
                subtitle: format!("You connected with {}", name),
                description: format!(
                    "{} is one of our top creators. Check out their exclusive content.",
                    name
                ),
                icon: "💎".to_string(),
                primary_cta: cta("View Profile", CtaAction::ViewProfile),
                secondary_cta: Some(cta("Send a Message", CtaAction::OpenChat)),
            },
        },
        ConnectionType::Other(_) => generic(name),
    }
}

fn generic(name: &str) -> Presentation {
    Presentation {
        title: "New Connection".to_string(),
        subtitle: format!("You have a new connection with {}", name),
        description: "Say hello and see where it goes.".to_string(),
        icon: "✨".to_string(),
        primary_cta: cta("Say Hello", CtaAction::OpenChat),
        secondary_cta: Some(cta("View Profile", CtaAction::ViewProfile)),
    }
}
