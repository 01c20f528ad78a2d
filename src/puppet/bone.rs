/// Humanoid bones addressable by the control core.
///
/// The set mirrors the standard VRM humanoid rig; anything outside it is
/// rejected at the parse boundary so downstream maps never carry stray names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bone {
    Hips,
    Spine,
    Chest,
    UpperChest,
    Neck,
    Head,
    LeftShoulder,
    LeftUpperArm,
    LeftLowerArm,
    LeftHand,
    RightShoulder,
    RightUpperArm,
    RightLowerArm,
    RightHand,
    LeftUpperLeg,
    LeftLowerLeg,
    LeftFoot,
    RightUpperLeg,
    RightLowerLeg,
    RightFoot,
}

impl Bone {
    pub const ALL: [Bone; 20] = [
        Bone::Hips,
        Bone::Spine,
        Bone::Chest,
        Bone::UpperChest,
        Bone::Neck,
        Bone::Head,
        Bone::LeftShoulder,
        Bone::LeftUpperArm,
        Bone::LeftLowerArm,
        Bone::LeftHand,
        Bone::RightShoulder,
        Bone::RightUpperArm,
        Bone::RightLowerArm,
        Bone::RightHand,
        Bone::LeftUpperLeg,
        Bone::LeftLowerLeg,
        Bone::LeftFoot,
        Bone::RightUpperLeg,
        Bone::RightLowerLeg,
        Bone::RightFoot,
    ];

    /// VRM humanoid bone name.
    pub fn as_str(self) -> &'static str {
        match self {
            Bone::Hips => "hips",
            Bone::Spine => "spine",
            Bone::Chest => "chest",
            Bone::UpperChest => "upperChest",
            Bone::Neck => "neck",
            Bone::Head => "head",
            Bone::LeftShoulder => "leftShoulder",
            Bone::LeftUpperArm => "leftUpperArm",
            Bone::LeftLowerArm => "leftLowerArm",
            Bone::LeftHand => "leftHand",
            Bone::RightShoulder => "rightShoulder",
            Bone::RightUpperArm => "rightUpperArm",
            Bone::RightLowerArm => "rightLowerArm",
            Bone::RightHand => "rightHand",
            Bone::LeftUpperLeg => "leftUpperLeg",
            Bone::LeftLowerLeg => "leftLowerLeg",
            Bone::LeftFoot => "leftFoot",
            Bone::RightUpperLeg => "rightUpperLeg",
            Bone::RightLowerLeg => "rightLowerLeg",
            Bone::RightFoot => "rightFoot",
        }
    }

    pub fn parse(name: &str) -> Option<Bone> {
        Bone::ALL.iter().copied().find(|b| b.as_str() == name)
    }
}
