//! Deployment descriptors of the demo modules, in their JSON form.

/// `ejb-jar` of the HR module. Annotations stay in effect.
pub const HR_EJB_JAR: &str = r#"{
    "metadata_complete": false,
    "enterprise_beans": [
        {
            "ejb_name": "EmployeeDirectoryBean",
            "security_role_refs": [{ "role_name": "hr-admin", "role_link": "Manager" }]
        },
        { "ejb_name": "PayrollBean" },
        { "ejb_name": "ApprovalBean" },
        { "ejb_name": "MaintenanceBean" },
        { "ejb_name": "PremiumAccountBean" }
    ],
    "assembly_descriptor": {
        "security_roles": ["Employee", "Manager", "Payroll", "Auditor", "Customer", "Premium"],
        "method_permissions": [
            {
                "role_names": ["Employee", "Payroll"],
                "methods": [
                    { "ejb_name": "EmployeeDirectoryBean", "method_name": "list_employees", "method_params": [] }
                ]
            }
        ],
        "exclude_list": [
            { "ejb_name": "ApprovalBean", "method_name": "approve" }
        ]
    }
}"#;

/// Vendor extension of the HR module.
pub const HR_EXTENSION: &str = r#"{
    "beans": [
        {
            "ejb_name": "PayrollBean",
            "run_as_modes": [
                {
                    "mode": "CALLER_IDENTITY",
                    "methods": [{ "ejb_name": "PayrollBean", "method_name": "preview" }]
                },
                {
                    "mode": "SYSTEM_IDENTITY",
                    "methods": [{ "ejb_name": "PayrollBean", "method_name": "close_period" }]
                }
            ]
        }
    ]
}"#;

/// `ejb-jar` of the archive module. Metadata-complete: annotations are ignored.
pub const ARCHIVE_EJB_JAR: &str = r#"{
    "metadata_complete": true,
    "enterprise_beans": [{ "ejb_name": "ArchiveBean" }],
    "assembly_descriptor": {
        "security_roles": ["Archivist"],
        "method_permissions": [
            {
                "role_names": ["Archivist"],
                "methods": [{ "ejb_name": "ArchiveBean", "method_name": "restore", "method_params": ["i32"] }]
            }
        ]
    }
}"#;
