use super::CommandCategory::{self, Appliance, Billing, Compute, Global, Misc, Network, Security, Storage};

pub(super) struct CommandSpec {
    pub(super) command: &'static str,
    pub(super) category: CommandCategory,
    pub(super) description: &'static str,
    pub(super) subcommands: &'static [&'static str],
}

const CRUD: &[&str] = &["list", "create", "read", "update", "delete"];
const READ_ONLY: &[&str] = &["list", "read"];
const APPLIANCE_POWER: &[&str] = &[
    "list",
    "create",
    "read",
    "update",
    "delete",
    "boot",
    "shutdown",
    "reset",
    "wait-until-ready",
    "wait-until-shutdown",
];
const MEDIA: &[&str] = &[
    "list",
    "create",
    "read",
    "update",
    "delete",
    "upload",
    "download",
    "ftp-open",
    "ftp-close",
    "wait-until-ready",
];

pub(super) const STANDALONE_COMMANDS: &[&str] = &["version", "rest", "update-self"];

pub(super) const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "server",
        category: Compute,
        description: "Manage virtual servers",
        subcommands: &[
            "list",
            "create",
            "read",
            "update",
            "delete",
            "boot",
            "shutdown",
            "reset",
            "send-nmi",
            "monitor-cpu",
            "ssh",
            "vnc",
            "rdp",
            "wait-until-ready",
            "wait-until-shutdown",
        ],
    },
    CommandSpec {
        command: "server-plan",
        category: Compute,
        description: "List server plans",
        subcommands: READ_ONLY,
    },
    CommandSpec {
        command: "private-host",
        category: Compute,
        description: "Manage dedicated private hosts",
        subcommands: CRUD,
    },
    CommandSpec {
        command: "private-host-plan",
        category: Compute,
        description: "List private host plans",
        subcommands: READ_ONLY,
    },
    CommandSpec {
        command: "disk",
        category: Storage,
        description: "Manage disks",
        subcommands: &[
            "list",
            "create",
            "read",
            "update",
            "delete",
            "edit",
            "resize-partition",
            "connect-to-server",
            "disconnect-from-server",
            "monitor-disk",
            "wait-until-ready",
        ],
    },
    CommandSpec {
        command: "disk-plan",
        category: Storage,
        description: "List disk plans",
        subcommands: READ_ONLY,
    },
    CommandSpec {
        command: "archive",
        category: Storage,
        description: "Manage archives",
        subcommands: MEDIA,
    },
    CommandSpec {
        command: "cdrom",
        category: Storage,
        description: "Manage ISO images",
        subcommands: MEDIA,
    },
    CommandSpec {
        command: "auto-backup",
        category: Storage,
        description: "Manage scheduled disk backups",
        subcommands: CRUD,
    },
    CommandSpec {
        command: "nfs",
        category: Storage,
        description: "Manage NFS appliances",
        subcommands: APPLIANCE_POWER,
    },
    CommandSpec {
        command: "switch",
        category: Network,
        description: "Manage switches",
        subcommands: &[
            "list",
            "create",
            "read",
            "update",
            "delete",
            "connect-to-bridge",
            "disconnect-from-bridge",
        ],
    },
    CommandSpec {
        command: "bridge",
        category: Network,
        description: "Manage bridges between zones",
        subcommands: CRUD,
    },
    CommandSpec {
        command: "internet",
        category: Network,
        description: "Manage routers with internet access",
        subcommands: &[
            "list",
            "create",
            "read",
            "update",
            "delete",
            "update-bandwidth",
            "enable-ipv6",
            "disable-ipv6",
            "monitor-router",
            "wait-until-ready",
        ],
    },
    CommandSpec {
        command: "internet-plan",
        category: Network,
        description: "List router bandwidth plans",
        subcommands: READ_ONLY,
    },
    CommandSpec {
        command: "ipaddress",
        category: Network,
        description: "Manage IPv4 addresses and reverse DNS",
        subcommands: &["list", "read", "update"],
    },
    CommandSpec {
        command: "ipv6addr",
        category: Network,
        description: "Manage IPv6 addresses",
        subcommands: CRUD,
    },
    CommandSpec {
        command: "subnet",
        category: Network,
        description: "Manage router subnets",
        subcommands: READ_ONLY,
    },
    CommandSpec {
        command: "packet-filter",
        category: Security,
        description: "Manage packet filters",
        subcommands: CRUD,
    },
    CommandSpec {
        command: "ssh-key",
        category: Security,
        description: "Manage registered SSH public keys",
        subcommands: &["list", "create", "read", "update", "delete", "generate"],
    },
    CommandSpec {
        command: "certificate-authority",
        category: Security,
        description: "Manage private certificate authorities",
        subcommands: CRUD,
    },
    CommandSpec {
        command: "database",
        category: Appliance,
        description: "Manage database appliances",
        subcommands: &[
            "list",
            "create",
            "read",
            "update",
            "delete",
            "boot",
            "shutdown",
            "reset",
            "monitor-cpu",
            "monitor-database",
            "wait-until-ready",
            "wait-until-shutdown",
        ],
    },
    CommandSpec {
        command: "load-balancer",
        category: Appliance,
        description: "Manage load balancer appliances",
        subcommands: APPLIANCE_POWER,
    },
    CommandSpec {
        command: "vpc-router",
        category: Appliance,
        description: "Manage VPC router appliances",
        subcommands: &[
            "list",
            "create",
            "read",
            "update",
            "delete",
            "boot",
            "shutdown",
            "reset",
            "monitor-interface",
            "logs",
            "wait-until-ready",
            "wait-until-shutdown",
        ],
    },
    CommandSpec {
        command: "mobile-gateway",
        category: Appliance,
        description: "Manage mobile gateway appliances",
        subcommands: APPLIANCE_POWER,
    },
    CommandSpec {
        command: "proxy-lb",
        category: Appliance,
        description: "Manage enhanced load balancers",
        subcommands: &[
            "list",
            "create",
            "read",
            "update",
            "delete",
            "renew-lets-encrypt-cert",
            "monitor-connection",
        ],
    },
    CommandSpec {
        command: "gslb",
        category: Appliance,
        description: "Manage global server load balancing",
        subcommands: CRUD,
    },
    CommandSpec {
        command: "dns",
        category: Appliance,
        description: "Manage DNS zones",
        subcommands: CRUD,
    },
    CommandSpec {
        command: "simple-monitor",
        category: Appliance,
        description: "Manage simple monitoring",
        subcommands: &["list", "create", "read", "update", "delete", "health-status"],
    },
    CommandSpec {
        command: "enhanced-db",
        category: Appliance,
        description: "Manage enhanced databases",
        subcommands: CRUD,
    },
    CommandSpec {
        command: "container-registry",
        category: Appliance,
        description: "Manage container registries",
        subcommands: CRUD,
    },
    CommandSpec {
        command: "sim",
        category: Appliance,
        description: "Manage SIM cards",
        subcommands: &[
            "list",
            "create",
            "read",
            "update",
            "delete",
            "activate",
            "deactivate",
            "logs",
        ],
    },
    CommandSpec {
        command: "note",
        category: Misc,
        description: "Manage startup scripts",
        subcommands: CRUD,
    },
    CommandSpec {
        command: "icon",
        category: Misc,
        description: "Manage icons",
        subcommands: CRUD,
    },
    CommandSpec {
        command: "license",
        category: Misc,
        description: "Manage software licenses",
        subcommands: CRUD,
    },
    CommandSpec {
        command: "license-info",
        category: Misc,
        description: "List available license types",
        subcommands: READ_ONLY,
    },
    CommandSpec {
        command: "webaccel",
        category: Misc,
        description: "Manage web accelerator sites",
        subcommands: &["list", "read", "read-certificate", "upsert-certificate", "delete-all-cache"],
    },
    CommandSpec {
        command: "bill",
        category: Billing,
        description: "Show invoices",
        subcommands: &["list", "csv"],
    },
    CommandSpec {
        command: "coupon",
        category: Billing,
        description: "List coupons",
        subcommands: &["list"],
    },
    CommandSpec {
        command: "service-class",
        category: Billing,
        description: "List service prices",
        subcommands: &["list"],
    },
    CommandSpec {
        command: "self",
        category: Billing,
        description: "Show the current account",
        subcommands: &["read"],
    },
    CommandSpec {
        command: "zone",
        category: Global,
        description: "List zones",
        subcommands: READ_ONLY,
    },
    CommandSpec {
        command: "region",
        category: Global,
        description: "List regions",
        subcommands: READ_ONLY,
    },
    CommandSpec {
        command: "config",
        category: Global,
        description: "Manage CLI profiles",
        subcommands: &["list", "create", "read", "update", "delete", "use", "current", "edit"],
    },
    CommandSpec {
        command: "completion",
        category: Global,
        description: "Generate shell completion scripts",
        subcommands: &["bash", "zsh", "fish", "powershell"],
    },
    CommandSpec {
        command: "version",
        category: Global,
        description: "Show version information",
        subcommands: &[],
    },
    CommandSpec {
        command: "rest",
        category: Global,
        description: "Call the API directly",
        subcommands: &[],
    },
    CommandSpec {
        command: "update-self",
        category: Global,
        description: "Update the CLI to the latest release",
        subcommands: &[],
    },
];
